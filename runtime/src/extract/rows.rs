//! Schema-driven row extraction over a parsed document.

use super::currency::{normalize_amount, to_monetary_amount, CurrencyMode};
use super::schema::{Field, FieldKind, FieldSpec, Locator, TableSchema};
use crate::error::ExtractError;
use crate::model::MonetaryAmount;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;

/// A typed value read out of a row.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Money(MonetaryAmount),
}

/// A field that was located but could not be converted.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldProblem {
    pub field: Field,
    pub error: ExtractError,
}

/// One table row with its fields resolved.
///
/// Fields that were optional and absent, or that failed conversion, have
/// no value. Conversion failures are kept in `problems`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRow {
    /// Index of the row among the rows matched in its table.
    pub index: usize,
    values: HashMap<Field, CellValue>,
    pub problems: Vec<FieldProblem>,
}

impl ExtractedRow {
    pub fn text(&self, field: Field) -> Option<&str> {
        match self.values.get(&field) {
            Some(CellValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Text of `field`, or an empty string when it is absent.
    pub fn text_or_empty(&self, field: Field) -> String {
        self.text(field).unwrap_or_default().to_string()
    }

    pub fn number(&self, field: Field) -> Option<f64> {
        match self.values.get(&field) {
            Some(CellValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn money(&self, field: Field) -> Option<MonetaryAmount> {
        match self.values.get(&field) {
            Some(CellValue::Money(m)) => Some(*m),
            _ => None,
        }
    }
}

/// Compile a schema selector.
pub fn selector(css: &str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css.to_string()))
}

/// Locate the schema's container element in `document`.
///
/// `Ok(None)` means the page has no such element; callers decide how loud
/// to be about it.
pub fn find_container<'a>(
    document: &'a Html,
    schema: &TableSchema,
) -> Result<Option<ElementRef<'a>>, ExtractError> {
    let sel = selector(schema.container)?;
    Ok(document.select(&sel).next())
}

/// Walk the rows of `schema` inside `scope` and resolve each field.
///
/// No matching rows is an empty result. Rows with no data cells at all
/// (header rows made of `th`) are skipped when the schema addresses cells
/// by index. A row missing a required cell or element is an error.
pub fn extract_rows(
    scope: ElementRef<'_>,
    schema: &TableSchema,
    mode: CurrencyMode,
) -> Result<Vec<ExtractedRow>, ExtractError> {
    let row_sel = selector(&schema.row_selector())?;
    let cell_sel = schema.cells.map(selector).transpose()?;
    let finders = compile_finders(schema)?;
    let min_cells = schema.min_cells();

    let mut out = Vec::new();

    for (index, row) in scope.select(&row_sel).enumerate() {
        let cells: Vec<ElementRef<'_>> = match &cell_sel {
            Some(sel) => row.select(sel).collect(),
            None => Vec::new(),
        };

        if min_cells > 0 {
            if cells.is_empty() {
                continue;
            }
            if cells.len() < min_cells {
                return Err(ExtractError::MalformedRow {
                    table: schema.name,
                    row: index,
                    detail: format!("expected {min_cells} cells, found {}", cells.len()),
                });
            }
        }

        out.push(extract_row(index, row, &cells, schema, &finders, mode)?);
    }

    Ok(out)
}

/// One compiled selector per `Find` field, aligned with `schema.fields`.
fn compile_finders(schema: &TableSchema) -> Result<Vec<Option<Selector>>, ExtractError> {
    schema
        .fields
        .iter()
        .map(|spec| match spec.locator {
            Locator::Find(css) => selector(css).map(Some),
            Locator::Cell(_) => Ok(None),
        })
        .collect()
}

fn extract_row(
    index: usize,
    row: ElementRef<'_>,
    cells: &[ElementRef<'_>],
    schema: &TableSchema,
    finders: &[Option<Selector>],
    mode: CurrencyMode,
) -> Result<ExtractedRow, ExtractError> {
    let mut values = HashMap::new();
    let mut problems = Vec::new();

    for (spec, finder) in schema.fields.iter().zip(finders) {
        let element = match locate(row, cells, spec, finder.as_ref()) {
            Some(el) => el,
            None if spec.required => {
                return Err(ExtractError::MalformedRow {
                    table: schema.name,
                    row: index,
                    detail: missing_detail(spec, cells.len()),
                });
            }
            None => continue,
        };

        let text = element_text(element);
        match convert(&text, spec.kind, mode) {
            Ok(Some(value)) => {
                values.insert(spec.field, value);
            }
            Ok(None) => {}
            Err(error) => problems.push(FieldProblem {
                field: spec.field,
                error,
            }),
        }
    }

    Ok(ExtractedRow {
        index,
        values,
        problems,
    })
}

fn locate<'a>(
    row: ElementRef<'a>,
    cells: &[ElementRef<'a>],
    spec: &FieldSpec,
    finder: Option<&Selector>,
) -> Option<ElementRef<'a>> {
    match spec.locator {
        Locator::Cell(i) => cells.get(i).copied(),
        Locator::Find(_) => finder.and_then(|sel| row.select(sel).next()),
    }
}

fn missing_detail(spec: &FieldSpec, found: usize) -> String {
    match spec.locator {
        Locator::Cell(i) => format!("expected {} cells, found {found}", i + 1),
        Locator::Find(css) => format!("no element matches `{css}` for {}", spec.field.as_str()),
    }
}

fn convert(
    text: &str,
    kind: FieldKind,
    mode: CurrencyMode,
) -> Result<Option<CellValue>, ExtractError> {
    match kind {
        FieldKind::Text => Ok(Some(CellValue::Text(text.to_string()))),
        FieldKind::Quantity => normalize_amount(text).map(|n| Some(CellValue::Number(n))),
        FieldKind::Money => Ok(to_monetary_amount(Some(text), mode)?.map(CellValue::Money)),
    }
}

/// Text content of an element with runs of whitespace collapsed.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
