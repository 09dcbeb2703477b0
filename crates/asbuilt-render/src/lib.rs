//! # asbuilt-render
//!
//! Rendering backends for as-built installation reports.
//!
//! This crate provides:
//! - Multi-sheet Excel workbooks with KPIs, charts and conditional formats
//! - Paginated PDF documents with repeated table headers
//! - Shared per-phase table layouts used by both
//!
//! ## Example
//!
//! ```rust,ignore
//! use asbuilt_core::{Renderer, Report, ReportRequest};
//! use asbuilt_render::{ExcelRenderer, PdfRenderer};
//!
//! let report = Report::from_request(ReportRequest::from_json(&json)?);
//!
//! // Workbook
//! let xlsx_bytes = ExcelRenderer::new().render(&report)?;
//! std::fs::write("as_built.xlsx", xlsx_bytes)?;
//!
//! // Document, one page per phase
//! let pdf_bytes = PdfRenderer::new().page_per_phase().render(&report)?;
//! std::fs::write("as_built.pdf", pdf_bytes)?;
//! ```

pub mod excel;
pub mod pdf;
pub mod tables;

pub use excel::{ExcelRenderer, SheetKind};
pub use pdf::{PdfRenderer, SectionKind};
pub use tables::{phase_table, CellValue, Column, Table};
