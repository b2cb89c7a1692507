//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerics stay clean and testable
//! - output changes are localized

use crate::cosmology::{Cosmology, significant};
use crate::domain::Observable;
use crate::error::Result;
use crate::io::Table;
use crate::realizations::Realization;

/// Table of the built-in realizations.
pub fn format_realizations() -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!(
            "{:<10} {:>7} {:>8} {:>8} {:>8} {:>7}  {}",
            "name", "H0", "Om0", "Ode0", "Ob0", "Tcmb0", "reference"
        ),
    );
    push_line(
        &mut out,
        format!("{:-<10} {:-<7} {:-<8} {:-<8} {:-<8} {:-<7}  {:-<40}", "", "", "", "", "", "", ""),
    );

    for r in Realization::ALL {
        let p = r.parameters();
        // Ode0 is derived from flatness, so show what the model actually uses.
        let ode0 = r.cosmology().map(|c| c.ode0()).ok();
        push_line(
            &mut out,
            format!(
                "{:<10} {:>7.2} {:>8.5} {:>8} {:>8} {:>7.4}  {}",
                r.name(),
                p.h0,
                p.om0,
                ode0.map(|v| format!("{v:.5}")).unwrap_or_else(|| "-".into()),
                p.ob0.map(|v| format!("{v:.5}")).unwrap_or_else(|| "-".into()),
                p.tcmb0,
                truncate(r.reference(), 60),
            ),
        );
    }
    out
}

/// Parameter summary plus derived present-day quantities.
pub fn format_summary(cosmo: &Cosmology) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== cosmo - {} ===\n", cosmo.class_name()));
    out.push_str(&format!("{cosmo}\n"));

    out.push_str("\nDensities today:\n");
    out.push_str(&format!("- Om0     : {:.6}\n", cosmo.om0()));
    out.push_str(&format!("- Ode0    : {:.6}\n", cosmo.ode0()));
    out.push_str(&format!("- Ok0     : {:.6}\n", cosmo.ok0()));
    out.push_str(&format!("- Ogamma0 : {:.6e}\n", cosmo.ogamma0()));
    out.push_str(&format!("- Onu0    : {:.6e}\n", cosmo.onu0()));
    match cosmo.ob0() {
        Some(ob0) => {
            out.push_str(&format!("- Ob0     : {ob0:.6}\n"));
            if let Ok(odm0) = cosmo.odm0() {
                out.push_str(&format!("- Odm0    : {odm0:.6}\n"));
            }
        }
        None => out.push_str("- Ob0     : unset\n"),
    }

    out.push_str("\nDark energy:\n");
    out.push_str(&format!("- model   : {}\n", cosmo.dark_energy().label()));
    for (key, value) in cosmo.dark_energy().parameters() {
        out.push_str(&format!("- {key:<8}: {value}\n"));
    }

    out.push_str("\nDerived:\n");
    out.push_str(&format!("- Hubble time        : {:.6} Gyr\n", cosmo.hubble_time()));
    out.push_str(&format!("- Hubble distance    : {:.4} Mpc\n", cosmo.hubble_distance()));
    out.push_str(&format!("- critical density0  : {:.6e} g / cm3\n", cosmo.critical_density0()));
    out.push_str(&format!("- Tnu0               : {:.6} K\n", cosmo.tnu0()));
    out.push_str(&format!("- massive neutrinos  : {}\n", cosmo.has_massive_nu()));
    out.push_str(&format!("- expansion path     : {:?}\n", cosmo.expansion_path()));
    match cosmo.age_at(0.0) {
        Ok(age) => out.push_str(&format!("- age today          : {age:.6} Gyr\n")),
        Err(err) => out.push_str(&format!("- age today          : undefined ({err})\n")),
    }

    out
}

/// One row per redshift, one column per observable.
///
/// Failed cells print as `-`; their reasons are listed under the table.
pub fn format_eval(z: &[f64], columns: &[(Observable, Vec<Result<f64>>)]) -> String {
    let mut out = String::new();
    let mut notes = Vec::new();

    let mut header = format!("{:>12}", "z");
    let mut rule = format!("{:-<12}", "");
    for (observable, _) in columns {
        header.push_str(&format!(" {:>w$}", column_title(*observable), w = CELL));
        rule.push_str(&format!(" {:-<w$}", "", w = CELL));
    }
    push_line(&mut out, header);
    push_line(&mut out, rule);

    for (row, zi) in z.iter().enumerate() {
        let mut line = format!("{:>12}", significant(*zi, 8));
        for (observable, results) in columns {
            let cell = match &results[row] {
                Ok(v) => fmt_value(*v),
                Err(err) => {
                    notes.push(format!("{observable} at z={zi}: {err}"));
                    "-".to_string()
                }
            };
            line.push_str(&format!(" {cell:>w$}", w = CELL));
        }
        push_line(&mut out, line);
    }

    if !notes.is_empty() {
        out.push_str("\nUndefined:\n");
        for note in notes {
            out.push_str(&format!("- {note}\n"));
        }
    }
    out
}

/// Target values and the redshifts that reach them.
pub fn format_solutions(observable: Observable, targets: &[f64], results: &[Result<f64>]) -> String {
    let mut out = String::new();
    push_line(
        &mut out,
        format!("{:>w$} {:>14}  {}", column_title(observable), "z", "status", w = CELL),
    );
    push_line(&mut out, format!("{:-<w$} {:-<14}  {:-<8}", "", "", "", w = CELL));
    for (target, result) in targets.iter().zip(results) {
        let line = match result {
            Ok(z) => format!("{:>w$} {:>14.8}  ok", fmt_value(*target), z, w = CELL),
            Err(err) => format!("{:>w$} {:>14}  {err}", fmt_value(*target), "-", w = CELL),
        };
        push_line(&mut out, line);
    }
    out
}

/// Text rendering of a tabulated grid.
pub fn format_table(table: &Table) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n", table.cosmology));

    let mut header = format!("{:>12}", "z");
    let mut rule = format!("{:-<12}", "");
    for column in &table.columns {
        header.push_str(&format!(" {:>w$}", column_title(column.observable), w = CELL));
        rule.push_str(&format!(" {:-<w$}", "", w = CELL));
    }
    push_line(&mut out, header);
    push_line(&mut out, rule);

    for (row, zi) in table.z.iter().enumerate() {
        let mut line = format!("{:>12}", significant(*zi, 8));
        for col in 0..table.columns.len() {
            let cell = table.cell(row, col).map(fmt_value).unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {cell:>w$}", w = CELL));
        }
        push_line(&mut out, line);
    }
    out
}

const CELL: usize = 18;

fn column_title(observable: Observable) -> String {
    let title = match observable.unit() {
        "" => observable.name().to_string(),
        unit => format!("{} [{unit}]", observable.name()),
    };
    truncate(&title, CELL)
}

/// Fixed notation in the comfortable range, scientific outside it.
fn fmt_value(v: f64) -> String {
    let a = v.abs();
    if v == 0.0 || (1e-3..1e7).contains(&a) {
        format!("{v:.6}")
    } else {
        format!("{v:.6e}")
    }
}

fn push_line(out: &mut String, line: String) {
    out.push_str(line.trim_end());
    out.push('\n');
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, ch) in s.chars().enumerate() {
        if i + 1 >= max {
            break;
        }
        out.push(ch);
    }
    out.push('.');
    out
}
