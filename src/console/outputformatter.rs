//! ASCII table rendering for console screens. Honors the SPLASP_OUTPUT env
//! override to force raw JSON instead of tables.

use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::client::schemas::{AnalysisReport, ProjectSummary, ReadSession};

fn json_output_forced() -> bool {
    std::env::var("SPLASP_OUTPUT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Print a listing either as an ASCII table or, under the JSON override, as
/// pretty-printed JSON of the wire value.
pub fn print_listing<T: Serialize>(value: &T, cols: &[&str], rows: Vec<Vec<String>>) {
    if json_output_forced() {
        let s = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
        println!("{}", s);
        return;
    }
    if rows.is_empty() {
        println!("(nothing to show)");
        return;
    }
    print_table(cols, &rows);
}

pub fn session_rows(sessions: &[ReadSession]) -> Vec<Vec<String>> {
    sessions
        .iter()
        .map(|s| {
            vec![
                s.id.to_string(),
                s.name.clone(),
                s.code.clone(),
                s.start_date.format("%Y-%m-%d %H:%M").to_string(),
                s.end_date.format("%Y-%m-%d %H:%M").to_string(),
                if s.is_active { "active".to_string() } else { "closed".to_string() },
            ]
        })
        .collect()
}

pub const SESSION_COLS: [&str; 6] = ["id", "name", "code", "starts", "ends", "state"];

pub fn project_rows(projects: &[ProjectSummary]) -> Vec<Vec<String>> {
    projects
        .iter()
        .map(|p| {
            // Show the latest version's numbers; versions arrive oldest first
            let latest = p.versions.last();
            vec![
                p.id.to_string(),
                p.title.clone(),
                p.versions.len().to_string(),
                latest.map(|v| v.project_level.to_string()).unwrap_or_default(),
                latest.map(|v| v.total_scripts.to_string()).unwrap_or_default(),
                p.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect()
}

pub const PROJECT_COLS: [&str; 6] = ["id", "title", "versions", "level", "scripts", "created"];

/// Render a full analysis report: headline numbers, the per-block table and
/// the feature findings.
pub fn print_analysis(report: &AnalysisReport) {
    if json_output_forced() {
        let s = serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
        println!("{}", s);
        return;
    }

    println!(
        "project level: {}   scripts: {} ({} duplicated)   combinations: {}",
        report.project_level, report.total_scripts, report.duplicate_scripts, report.total_combinations
    );

    if !report.blocks.is_empty() {
        let rows: Vec<Vec<String>> = report
            .blocks
            .iter()
            .map(|b| {
                vec![
                    b.owner.clone(),
                    b.name.clone(),
                    b.level.to_string(),
                    b.structural_changes.to_string(),
                    b.definition_changes.to_string(),
                    b.definition_level.to_string(),
                    b.feature_guarded_definition_changes.to_string(),
                    b.ast_pipeline_definition_changes.to_string(),
                ]
            })
            .collect();
        print_table(
            &["owner", "block", "level", "structural", "def changes", "def level", "guarded", "pipeline"],
            &rows,
        );
    }

    if !report.tangling_dict.is_empty() {
        let tangling: Vec<String> = report
            .tangling_dict
            .iter()
            .map(|(degree, count)| format!("{}x{}", degree, count))
            .collect();
        println!("tangling: {}", tangling.join(", "));
    }
    if !report.scattering_dict.is_empty() {
        for (feature, scripts) in &report.scattering_dict {
            println!("feature '{}' scattered across {} script(s)", feature, scripts.len());
        }
    }
    if !report.dead_features.is_empty() {
        println!("dead features: {}", report.dead_features.join(", "));
    }
}

// --- table mechanics ----------------------------------------------------

fn get_terminal_width() -> usize {
    match terminal_size() {
        Some((Width(w), _)) => (w as usize).max(40),
        None => 120,
    }
}

fn print_table(cols: &[&str], rows: &[Vec<String>]) {
    // Cap any one column at the terminal width so a long title cannot wrap
    let max_col_width = get_terminal_width().saturating_sub(4).max(8);

    let mut widths: Vec<usize> = cols.iter().map(|s| s.len().min(max_col_width)).collect();
    for r in rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] {
                widths[i] = w.min(max_col_width);
            }
        }
    }

    let sep = build_separator(&widths);
    println!("{}", sep);
    println!("{}", build_row(&cols.iter().map(|s| s.to_string()).collect::<Vec<_>>(), &widths));
    println!("{}", sep);
    for r in rows {
        println!("{}", build_row(r, &widths));
    }
    println!("{}", sep);
    println!("rows: {}", rows.len());
}

fn display_len(s: &str) -> usize {
    s.chars().count()
}

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let (text, align_right) = (truncate(&cell, *w), is_numeric_like(&cell));
        s.push(' ');
        if align_right {
            let pad = w.saturating_sub(display_len(&text));
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            let pad = w.saturating_sub(display_len(&text));
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max {
        return s.to_string();
    }
    if max <= 1 {
        return "…".to_string();
    }
    let take = max - 1;
    s.chars().take(take).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    let st = s.trim();
    if st.is_empty() {
        return false;
    }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() {
            has_digit = true;
            continue;
        }
        if ".-+eE,_".contains(ch) {
            continue;
        }
        return false;
    }
    has_digit
}
