//! Markdown output, grouped by year.

use crate::models::Publication;
use crate::processing::group_by_year;

/// Format publications as Markdown with one section per year. Publications
/// are expected in report order, so the "Unknown" section comes last.
#[must_use]
pub fn format_markdown(
    publications: &[Publication],
    title: &str,
    with_category: bool,
) -> String {
    let mut output = format!("# {title}\n\n");

    if publications.is_empty() {
        output.push_str("No publications found.\n");
        return output;
    }

    output.push_str(&format!("{} publications\n\n", publications.len()));

    for (year, members) in group_by_year(publications) {
        let heading = year.map_or_else(|| "Unknown".to_string(), |y| y.to_string());
        output.push_str(&format!("## {heading} ({})\n\n", members.len()));

        for (i, publication) in members.iter().enumerate() {
            output.push_str(&format_publication_markdown(
                publication,
                i + 1,
                with_category,
            ));
        }
        output.push('\n');
    }

    output
}

fn format_publication_markdown(
    publication: &Publication,
    index: usize,
    with_category: bool,
) -> String {
    let title = match &publication.link {
        Some(link) => format!("[{}]({link})", publication.title_for_display()),
        None => publication.title_for_display().to_string(),
    };
    let mut line = format!("{index}. **{title}**");

    if !publication.authors.is_empty() {
        line.push_str(&format!(" {}.", publication.author_names()));
    }
    if !publication.venue.is_empty() {
        line.push_str(&format!(" *{}*.", publication.venue));
    }

    let mut meta = vec![format!("Citations: {}", publication.citations)];
    if with_category {
        meta.push(format!("Type: {}", publication.category));
    }
    line.push_str(&format!(" ({})\n", meta.join(" | ")));
    line
}
