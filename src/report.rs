use crate::page_scrapers::JobRecord;

pub(crate) const NO_JOBS_TABLE: &str = "No new jobs found today.";
pub(crate) const NO_JOBS_MESSAGE: &str = "No new IT jobs found today from company career pages.";
const MESSAGE_HEADER: &str = "*Daily IT Jobs Update from Company Career Pages*\n\n";
const HEADERS: [&str; 6] = ["Company", "Title", "Location", "Link", "Keywords", "Tech Skills"];


/// A `|` in scraped text would otherwise start a new column
fn escape(cell: &str) -> String {
    cell.replace('|', "\\|")
}


fn row(job: &JobRecord) -> [String; 6] {
    [
        escape(&job.company),
        escape(&job.title),
        escape(&job.location),
        escape(&job.link),
        escape(&job.keywords.join(", ")),
        escape(&job.tech_skills.join(", ")),
    ]
}


fn push_row<S: AsRef<str>>(out: &mut String, cells: &[S], widths: &[usize]) {
    out.push('|');
    for (cell, width) in cells.iter().zip(widths) {
        let cell = cell.as_ref();
        out.push(' ');
        out.push_str(cell);
        out.extend(std::iter::repeat(' ').take(width - cell.chars().count()));
        out.push_str(" |");
    }
}


/// Renders `jobs` as a left-aligned pipe table, one row per job.
pub(crate) fn format_jobs_table(jobs: &[JobRecord]) -> String {
    if jobs.is_empty() {
        return NO_JOBS_TABLE.to_string();
    }

    let rows: Vec<_> = jobs.iter().map(row).collect();
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    push_row(&mut table, &HEADERS[..], &widths);
    table.push_str("\n|");
    for width in widths {
        table.extend(std::iter::repeat('-').take(width + 2));
        table.push('|');
    }
    for row in &rows {
        table.push('\n');
        push_row(&mut table, &row[..], &widths);
    }
    table
}


/// The full chat message for one run.
pub(crate) fn compose_message(jobs: &[JobRecord]) -> String {
    if jobs.is_empty() {
        return NO_JOBS_MESSAGE.to_string();
    }
    format!("{MESSAGE_HEADER}{}", format_jobs_table(jobs))
}
