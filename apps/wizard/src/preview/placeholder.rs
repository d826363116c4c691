//! Synthetic example content shown in place of empty sections when the
//! preview is asked for placeholders.

use crate::models::document::Section;
use crate::preview::renderer::{RenderedHeader, RenderedItem};

pub fn placeholder_header() -> RenderedHeader {
    RenderedHeader {
        name: "Your Name".to_string(),
        headline: Some("Your Target Role".to_string()),
        contact: vec![
            "you@example.com".to_string(),
            "+1 555 0100".to_string(),
            "City, Country".to_string(),
        ],
        links: vec!["linkedin.com/in/yourname".to_string()],
        summary: Some(
            "A short summary of who you are and the kind of work you want to do next.".to_string(),
        ),
        placeholder: true,
    }
}

fn item(heading: &str, subheading: Option<&str>, meta: Option<&str>, body: &[&str]) -> RenderedItem {
    RenderedItem {
        heading: heading.to_string(),
        subheading: subheading.map(str::to_string),
        meta: meta.map(str::to_string),
        body: body.iter().map(|line| line.to_string()).collect(),
    }
}

/// Example items for a body section. Scalar sections have no body rendering
/// and return nothing.
pub fn placeholder_items(section: Section) -> Vec<RenderedItem> {
    match section {
        Section::Education => vec![item(
            "State University",
            Some("B.Tech in Computer Science"),
            Some("2020 – 2024"),
            &["Grade: 8.7 CGPA"],
        )],
        Section::Skills => vec![item(
            "Technical",
            None,
            None,
            &["JavaScript, Python, SQL, Git"],
        )],
        Section::Projects => vec![item(
            "Portfolio Website",
            Some("React · Node.js"),
            Some("github.com/you/portfolio"),
            &["Built a responsive personal site showcasing projects and writing."],
        )],
        Section::Certifications => vec![item(
            "Cloud Practitioner",
            Some("Cloud Provider"),
            Some("2024"),
            &[],
        )],
        Section::Hackathons => vec![item(
            "City Hackathon",
            Some("Team Lead"),
            Some("2023"),
            &["Finalist", "Prototyped a transit-delay predictor in 24 hours."],
        )],
        Section::Internships => vec![item(
            "Software Engineering Intern",
            Some("Example Corp"),
            Some("Jun 2023 – Aug 2023"),
            &["Shipped an internal dashboard used by 40 support agents."],
        )],
        Section::Achievements => vec![item(
            "Dean's List",
            None,
            Some("2022"),
            &["Top 5% of the graduating class."],
        )],
        Section::Languages => vec![
            item("English", None, Some("Native"), &[]),
            item("Spanish", None, Some("Conversational"), &[]),
        ],
        Section::PersonalInfo
        | Section::SelectedJobRole
        | Section::SelectedTemplate
        | Section::Roadmap => Vec::new(),
    }
}
