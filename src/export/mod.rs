//! Phone directory export.
//!
//! The roster is grouped into one sheet per office by a pure function; the
//! xlsx bytes are then rendered from that structure.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{full_name, CONTACT_PLACEHOLDER};

/// Column labels of every directory sheet.
pub const COLUMNS: [&str; 7] = [
    "№",
    "Ф.И.О.",
    "Должность",
    "Рабочий телефон",
    "Правит. телефон",
    "Мобильный телефон",
    "№ кабинета",
];

const COLUMN_WIDTHS: [f64; 7] = [6.0, 38.0, 40.0, 18.0, 18.0, 20.0, 12.0];

const MAX_SHEET_NAME: usize = 31;
const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// One employee as read from storage, before grouping.
#[derive(Debug, Clone)]
pub struct DirectoryEntry {
    pub office_id: String,
    pub office_name: String,
    pub office_city: String,
    pub office_address: String,
    pub department_name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub patronymic: Option<String>,
    pub position_title: Option<String>,
    pub phone_work: Option<String>,
    pub phone_government: Option<String>,
    pub phone_mobile: Option<String>,
    pub office_number: Option<String>,
}

/// A printable directory line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryRow {
    pub number: usize,
    pub full_name: String,
    pub position: String,
    pub phone_work: String,
    pub phone_government: String,
    pub phone_mobile: String,
    pub office_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentSection {
    /// Empty for employees whose position has no department.
    pub name: String,
    pub rows: Vec<DirectoryRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficeSheet {
    pub office_id: String,
    pub office_name: String,
    /// Office name, qualified with the city when another office shares it.
    pub title: String,
    pub office_address: String,
    pub departments: Vec<DepartmentSection>,
}

/// Settings for the notice row printed on the central office sheet.
#[derive(Debug, Clone)]
pub struct DirectorySettings {
    pub central_office_name: String,
    pub central_office_fax: String,
}

/// Group entries by office, then department, then full name.
///
/// Offices and departments sort alphabetically; the unnamed department
/// comes last. Row numbers run through the whole sheet.
pub fn group_directory(entries: Vec<DirectoryEntry>) -> Vec<OfficeSheet> {
    type Departments = BTreeMap<(bool, String), Vec<DirectoryEntry>>;
    let mut offices: BTreeMap<(String, String), (String, String, Departments)> = BTreeMap::new();
    let mut name_counts: HashMap<String, HashSet<String>> = HashMap::new();

    for entry in entries {
        let department = entry
            .department_name
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let key = (department.is_none(), department.unwrap_or_default());
        name_counts
            .entry(entry.office_name.clone())
            .or_default()
            .insert(entry.office_id.clone());
        offices
            .entry((entry.office_name.clone(), entry.office_id.clone()))
            .or_insert_with(|| {
                (
                    entry.office_city.clone(),
                    entry.office_address.clone(),
                    BTreeMap::new(),
                )
            })
            .2
            .entry(key)
            .or_default()
            .push(entry);
    }

    offices
        .into_iter()
        .map(|((office_name, office_id), (city, office_address, departments))| {
            let mut number = 0;
            let departments = departments
                .into_iter()
                .map(|((_, name), mut members)| {
                    members.sort_by(|a, b| {
                        a.last_name
                            .cmp(&b.last_name)
                            .then_with(|| a.first_name.cmp(&b.first_name))
                            .then_with(|| a.patronymic.cmp(&b.patronymic))
                    });
                    let rows = members
                        .iter()
                        .map(|entry| {
                            number += 1;
                            directory_row(number, entry)
                        })
                        .collect();
                    DepartmentSection { name, rows }
                })
                .collect();
            let shared = name_counts.get(&office_name).map_or(0, HashSet::len) > 1;
            let title = if shared && !city.trim().is_empty() {
                format!("{} ({})", office_name, city.trim())
            } else {
                office_name.clone()
            };
            OfficeSheet {
                office_id,
                office_name,
                title,
                office_address,
                departments,
            }
        })
        .collect()
}

fn directory_row(number: usize, entry: &DirectoryEntry) -> DirectoryRow {
    DirectoryRow {
        number,
        full_name: full_name(
            &entry.last_name,
            &entry.first_name,
            entry.patronymic.as_deref(),
        ),
        position: cell(entry.position_title.as_deref()),
        phone_work: cell(entry.phone_work.as_deref()),
        phone_government: cell(entry.phone_government.as_deref()),
        phone_mobile: cell(entry.phone_mobile.as_deref()),
        office_number: cell(entry.office_number.as_deref()),
    }
}

/// Missing and placeholder values print as empty cells.
fn cell(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(v) if v != CONTACT_PLACEHOLDER => v.to_string(),
        _ => String::new(),
    }
}

/// A row of a rendered sheet, top to bottom.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetLine {
    Title(String),
    Notice(String),
    Header,
    Department(String),
    Entry(DirectoryRow),
}

/// Lay out one office sheet.
///
/// The central office gets a notice row between the title and the column
/// header.
pub fn sheet_lines(sheet: &OfficeSheet, settings: &DirectorySettings) -> Vec<SheetLine> {
    let mut lines = vec![SheetLine::Title(sheet.title.clone())];
    if sheet.office_name == settings.central_office_name {
        lines.push(SheetLine::Notice(central_notice(
            &sheet.office_address,
            &settings.central_office_fax,
        )));
    }
    lines.push(SheetLine::Header);
    for department in &sheet.departments {
        lines.push(SheetLine::Department(department.name.clone()));
        lines.extend(department.rows.iter().cloned().map(SheetLine::Entry));
    }
    lines
}

fn central_notice(address: &str, fax: &str) -> String {
    let address = cell(Some(address));
    let fax = cell(Some(fax));
    match (address.is_empty(), fax.is_empty()) {
        (false, false) => format!("Адрес: {}, факс: {}", address, fax),
        (false, true) => format!("Адрес: {}", address),
        (true, false) => format!("Факс: {}", fax),
        (true, true) => String::new(),
    }
}

/// Make `name` a valid worksheet name not yet in `used`.
///
/// Worksheet names are at most 31 characters, exclude `[]:*?/\` and are
/// compared case-insensitively.
pub fn sanitize_sheet_name(name: &str, used: &mut HashSet<String>) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if FORBIDDEN_SHEET_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let base = if cleaned.is_empty() { "Sheet" } else { cleaned };

    let mut candidate: String = base.chars().take(MAX_SHEET_NAME).collect();
    let mut suffix = 2;
    while used.contains(&candidate.to_lowercase()) {
        let tail = format!(" ({})", suffix);
        let keep = MAX_SHEET_NAME - tail.chars().count();
        candidate = base.chars().take(keep).collect::<String>() + &tail;
        suffix += 1;
    }
    used.insert(candidate.to_lowercase());
    candidate
}

/// Download name of the workbook generated on `date`.
pub fn export_filename(date: NaiveDate) -> String {
    format!("phone_directory_{}.xlsx", date.format("%Y-%m-%d"))
}

/// Render the grouped directory as xlsx bytes.
pub fn render_workbook(
    sheets: &[OfficeSheet],
    settings: &DirectorySettings,
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();
    let title = Format::new().set_bold().set_font_size(14);
    let bold = Format::new().set_bold();
    let mut used = HashSet::new();

    if sheets.is_empty() {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name("Справочник")?;
        for (col, label) in COLUMNS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *label, &bold)?;
        }
    }

    for sheet in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sanitize_sheet_name(&sheet.title, &mut used))?;
        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            worksheet.set_column_width(col as u16, *width)?;
        }

        for (index, line) in sheet_lines(sheet, settings).iter().enumerate() {
            let row = index as u32;
            match line {
                SheetLine::Title(text) => {
                    worksheet.write_string_with_format(row, 0, text, &title)?;
                }
                SheetLine::Notice(text) => {
                    worksheet.write_string(row, 0, text)?;
                }
                SheetLine::Header => {
                    for (col, label) in COLUMNS.iter().enumerate() {
                        worksheet.write_string_with_format(row, col as u16, *label, &bold)?;
                    }
                }
                SheetLine::Department(name) => {
                    worksheet.write_string_with_format(row, 1, name, &bold)?;
                }
                SheetLine::Entry(entry) => {
                    worksheet.write_number(row, 0, entry.number as f64)?;
                    let cells = [
                        &entry.full_name,
                        &entry.position,
                        &entry.phone_work,
                        &entry.phone_government,
                        &entry.phone_mobile,
                        &entry.office_number,
                    ];
                    for (offset, value) in cells.iter().enumerate() {
                        worksheet.write_string(row, offset as u16 + 1, value.as_str())?;
                    }
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
