//! Preview Renderer: projects a DocumentModel through a template into a
//! visual tree.
//!
//! `render` is stateless and deterministic: the same `(model, template,
//! options)` always serialises to the same bytes. It runs on every model
//! change, so it is a single linear pass with no caching.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::document::{DocumentModel, PersonalInfo, Section};
use crate::models::plan::{PremiumFeature, UpgradeRequired};
use crate::preview::placeholder::{placeholder_header, placeholder_items};
use crate::preview::templates::{resolve_template, SkillsLayout, Template, TemplateId};

// ────────────────────────────────────────────────────────────────────────────
// Output tree
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Fill empty sections with example content instead of omitting them.
    #[serde(default)]
    pub show_placeholder: bool,
    /// Template used when the requested id is not in the catalogue.
    #[serde(skip)]
    pub fallback: TemplateId,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedHeader {
    pub name: String,
    pub headline: Option<String>,
    pub contact: Vec<String>,
    pub links: Vec<String>,
    pub summary: Option<String>,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedItem {
    pub heading: String,
    pub subheading: Option<String>,
    pub meta: Option<String>,
    pub body: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedSection {
    pub section: Section,
    pub title: String,
    pub items: Vec<RenderedItem>,
    pub placeholder: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedDocument {
    pub template: TemplateId,
    pub template_name: &'static str,
    pub accent: Option<&'static str>,
    pub header: Option<RenderedHeader>,
    pub sections: Vec<RenderedSection>,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error(transparent)]
    UpgradeRequired(#[from] UpgradeRequired),
}

// ────────────────────────────────────────────────────────────────────────────
// Rendering
// ────────────────────────────────────────────────────────────────────────────

/// Renders `model` with the template named by `template_id`. Unknown ids use
/// `options.fallback`; premium templates need a premium model.
pub fn render(
    model: &DocumentModel,
    template_id: &str,
    options: RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    render_with(model, resolve_template(template_id, options.fallback), options)
}

/// Renders `model` with its own selected template.
pub fn render_selected(
    model: &DocumentModel,
    options: RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    render_with(model, model.selected_template, options)
}

fn render_with(
    model: &DocumentModel,
    id: TemplateId,
    options: RenderOptions,
) -> Result<RenderedDocument, RenderError> {
    if !id.is_selectable(model.is_premium) {
        return Err(UpgradeRequired {
            feature: PremiumFeature::Template(id),
        }
        .into());
    }
    let template = id.template();

    let sections = template
        .section_order
        .iter()
        .filter_map(|&section| {
            let items = section_items(template, section, model);
            let placeholder = items.is_empty();
            if placeholder && !options.show_placeholder {
                return None;
            }
            Some(RenderedSection {
                section,
                title: template.section_title(section),
                items: if placeholder {
                    placeholder_items(section)
                } else {
                    items
                },
                placeholder,
            })
        })
        .collect();

    Ok(RenderedDocument {
        template: id,
        template_name: template.display_name,
        accent: template.accent,
        header: render_header(model, options),
        sections,
    })
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn non_blank_opt(value: Option<&String>) -> Option<String> {
    value.and_then(|v| non_blank(v))
}

fn date_range(start: &str, end: Option<&String>) -> Option<String> {
    let start = non_blank(start)?;
    let end = non_blank_opt(end).unwrap_or_else(|| "Present".to_string());
    Some(format!("{start} – {end}"))
}

fn body_lines(text: &str) -> Vec<String> {
    text.lines().filter_map(non_blank).collect()
}

fn header_is_empty(info: &PersonalInfo) -> bool {
    [&info.full_name, &info.email, &info.phone, &info.location]
        .into_iter()
        .all(|v| v.trim().is_empty())
        && [&info.linkedin, &info.github, &info.portfolio, &info.summary]
            .into_iter()
            .all(|v| non_blank_opt(v.as_ref()).is_none())
}

fn render_header(model: &DocumentModel, options: RenderOptions) -> Option<RenderedHeader> {
    let info = &model.personal_info;
    if header_is_empty(info) {
        return options.show_placeholder.then(placeholder_header);
    }
    Some(RenderedHeader {
        name: info.full_name.trim().to_string(),
        headline: model.job_role().map(str::to_string),
        contact: [&info.email, &info.phone, &info.location]
            .into_iter()
            .filter_map(|v| non_blank(v))
            .collect(),
        links: [&info.linkedin, &info.github, &info.portfolio]
            .into_iter()
            .filter_map(|v| non_blank_opt(v.as_ref()))
            .collect(),
        summary: non_blank_opt(info.summary.as_ref()),
        placeholder: false,
    })
}

fn section_items(template: &Template, section: Section, model: &DocumentModel) -> Vec<RenderedItem> {
    match section {
        Section::Education => model
            .education
            .iter()
            .map(|e| {
                let degree = match non_blank(&e.field_of_study) {
                    Some(field) => format!("{} in {field}", e.degree.trim()),
                    None => e.degree.trim().to_string(),
                };
                RenderedItem {
                    heading: e.institution.trim().to_string(),
                    subheading: non_blank(&degree),
                    meta: date_range(&e.start_date, e.end_date.as_ref()),
                    body: non_blank_opt(e.grade.as_ref())
                        .map(|g| vec![format!("Grade: {g}")])
                        .unwrap_or_default(),
                }
            })
            .collect(),
        Section::Skills => skill_items(template, model),
        Section::Projects => model
            .projects
            .iter()
            .map(|p| RenderedItem {
                heading: p.title.trim().to_string(),
                subheading: non_blank(&p.tech_stack.join(" · ")),
                meta: non_blank_opt(p.link.as_ref()),
                body: body_lines(&p.description),
            })
            .collect(),
        Section::Certifications => model
            .certifications
            .iter()
            .map(|c| RenderedItem {
                heading: c.name.trim().to_string(),
                subheading: non_blank(&c.issuer),
                meta: non_blank_opt(c.issue_date.as_ref()),
                body: non_blank_opt(c.credential_url.as_ref())
                    .into_iter()
                    .collect(),
            })
            .collect(),
        Section::Hackathons => model
            .hackathons
            .iter()
            .map(|h| {
                let mut body: Vec<String> = non_blank_opt(h.outcome.as_ref()).into_iter().collect();
                body.extend(body_lines(&h.description));
                RenderedItem {
                    heading: h.name.trim().to_string(),
                    subheading: non_blank(&h.role),
                    meta: non_blank_opt(h.date.as_ref()),
                    body,
                }
            })
            .collect(),
        Section::Internships => model
            .internships
            .iter()
            .map(|i| RenderedItem {
                heading: i.role.trim().to_string(),
                subheading: non_blank(&i.company),
                meta: date_range(&i.start_date, i.end_date.as_ref()),
                body: body_lines(&i.description),
            })
            .collect(),
        Section::Achievements => model
            .achievements
            .iter()
            .map(|a| RenderedItem {
                heading: a.title.trim().to_string(),
                subheading: None,
                meta: non_blank_opt(a.date.as_ref()),
                body: body_lines(&a.description),
            })
            .collect(),
        Section::Languages => model
            .languages
            .iter()
            .map(|l| RenderedItem {
                heading: l.name.trim().to_string(),
                subheading: None,
                meta: Some(l.fluency.label().to_string()),
                body: Vec::new(),
            })
            .collect(),
        Section::PersonalInfo
        | Section::SelectedJobRole
        | Section::SelectedTemplate
        | Section::Roadmap => Vec::new(),
    }
}

fn skill_items(template: &Template, model: &DocumentModel) -> Vec<RenderedItem> {
    match template.skills_layout {
        SkillsLayout::Chips => model
            .skills
            .iter()
            .map(|s| RenderedItem {
                heading: s.name.trim().to_string(),
                subheading: non_blank_opt(s.category.as_ref()),
                meta: Some(s.level.label().to_string()),
                body: Vec::new(),
            })
            .collect(),
        SkillsLayout::Inline => {
            // Group by category in first-seen order so output is stable.
            let mut groups: Vec<(String, Vec<String>)> = Vec::new();
            for skill in model.skills.iter() {
                let category =
                    non_blank_opt(skill.category.as_ref()).unwrap_or_else(|| "Technical".to_string());
                let name = skill.name.trim().to_string();
                match groups.iter_mut().find(|(c, _)| *c == category) {
                    Some((_, names)) => names.push(name),
                    None => groups.push((category, vec![name])),
                }
            }
            groups
                .into_iter()
                .map(|(category, names)| RenderedItem {
                    heading: category,
                    subheading: None,
                    meta: None,
                    body: vec![names.join(", ")],
                })
                .collect()
        }
    }
}

impl RenderedDocument {
    /// Plain-text projection of the tree, used by text exporters.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        if let Some(header) = &self.header {
            out.push_str(&header.name);
            out.push('\n');
            if let Some(headline) = &header.headline {
                out.push_str(headline);
                out.push('\n');
            }
            let contact: Vec<&str> = header
                .contact
                .iter()
                .chain(header.links.iter())
                .map(String::as_str)
                .collect();
            if !contact.is_empty() {
                out.push_str(&contact.join(" | "));
                out.push('\n');
            }
            if let Some(summary) = &header.summary {
                out.push('\n');
                out.push_str(summary);
                out.push('\n');
            }
        }
        for section in &self.sections {
            out.push('\n');
            out.push_str(&section.title);
            out.push('\n');
            for item in &section.items {
                let mut line = format!("- {}", item.heading);
                if let Some(sub) = &item.subheading {
                    line.push_str(&format!(", {sub}"));
                }
                if let Some(meta) = &item.meta {
                    line.push_str(&format!(" ({meta})"));
                }
                out.push_str(&line);
                out.push('\n');
                for body in &item.body {
                    out.push_str("  ");
                    out.push_str(body);
                    out.push('\n');
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MutationDispatcher;
    use serde_json::json;

    const BODY_SECTIONS: [Section; 8] = [
        Section::Education,
        Section::Skills,
        Section::Projects,
        Section::Certifications,
        Section::Hackathons,
        Section::Internships,
        Section::Achievements,
        Section::Languages,
    ];

    fn sample_model() -> DocumentModel {
        let mut dispatcher = MutationDispatcher::default();
        dispatcher
            .update_section("selectedJobRole", json!("Backend Engineer"))
            .unwrap();
        dispatcher
            .update_section(
                "personalInfo",
                json!({
                    "full_name": "Jane Doe",
                    "email": "jane@x.com",
                    "phone": "555-0100",
                    "github": "github.com/jane"
                }),
            )
            .unwrap();
        dispatcher
            .update_section(
                "education",
                json!([{"institution": "MIT", "degree": "BSc", "field_of_study": "CS",
                        "start_date": "2019", "end_date": "2023"}]),
            )
            .unwrap();
        dispatcher
            .update_section(
                "skills",
                json!([
                    {"name": "Rust", "category": "Languages", "level": "expert"},
                    {"name": "Docker"},
                    {"name": "Go", "category": "Languages"}
                ]),
            )
            .unwrap();
        dispatcher.model().clone()
    }

    fn on() -> RenderOptions {
        RenderOptions {
            show_placeholder: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_placeholders_fill_every_section_of_empty_model() {
        let doc = render(&DocumentModel::default(), "classic", on()).unwrap();

        let header = doc.header.as_ref().unwrap();
        assert!(header.placeholder);
        assert!(!header.name.is_empty());

        let sections: Vec<_> = doc.sections.iter().map(|s| s.section).collect();
        for section in BODY_SECTIONS {
            assert!(sections.contains(&section), "{section} missing");
        }
        for section in &doc.sections {
            assert!(section.placeholder);
            assert!(!section.items.is_empty());
            assert!(section.items.iter().all(|i| !i.heading.is_empty()));
        }
    }

    #[test]
    fn test_without_placeholders_empty_sections_are_omitted() {
        let doc = render(&DocumentModel::default(), "classic", RenderOptions::default()).unwrap();
        assert!(doc.header.is_none());
        assert!(doc.sections.is_empty());
    }

    #[test]
    fn test_partial_model_renders_only_filled_sections() {
        let doc = render(&sample_model(), "classic", RenderOptions::default()).unwrap();
        let sections: Vec<_> = doc.sections.iter().map(|s| s.section).collect();
        assert_eq!(sections, vec![Section::Education, Section::Skills]);

        let header = doc.header.unwrap();
        assert_eq!(header.name, "Jane Doe");
        assert_eq!(header.headline.as_deref(), Some("Backend Engineer"));
        assert_eq!(header.contact, vec!["jane@x.com", "555-0100"]);
        assert_eq!(header.links, vec!["github.com/jane"]);
    }

    #[test]
    fn test_placeholders_only_replace_empty_sections() {
        let doc = render(&sample_model(), "classic", on()).unwrap();
        let education = doc
            .sections
            .iter()
            .find(|s| s.section == Section::Education)
            .unwrap();
        assert!(!education.placeholder);
        assert_eq!(education.items[0].heading, "MIT");
        assert_eq!(education.items[0].subheading.as_deref(), Some("BSc in CS"));
        assert_eq!(education.items[0].meta.as_deref(), Some("2019 – 2023"));

        let projects = doc
            .sections
            .iter()
            .find(|s| s.section == Section::Projects)
            .unwrap();
        assert!(projects.placeholder);
        assert!(!doc.header.unwrap().placeholder);
    }

    #[test]
    fn test_inline_skills_grouped_by_category() {
        let doc = render(&sample_model(), "classic", RenderOptions::default()).unwrap();
        let skills = &doc.sections[1];
        assert_eq!(skills.title, "SKILLS");
        let groups: Vec<_> = skills
            .items
            .iter()
            .map(|i| (i.heading.as_str(), i.body[0].as_str()))
            .collect();
        assert_eq!(
            groups,
            vec![("Languages", "Rust, Go"), ("Technical", "Docker")]
        );
    }

    #[test]
    fn test_chip_skills_carry_level() {
        let doc = render(&sample_model(), "modern", RenderOptions::default()).unwrap();
        let skills = doc
            .sections
            .iter()
            .find(|s| s.section == Section::Skills)
            .unwrap();
        assert_eq!(skills.items.len(), 3);
        assert_eq!(skills.items[0].meta.as_deref(), Some("Expert"));
        assert_eq!(doc.accent, Some("#2563eb"));
    }

    #[test]
    fn test_unknown_template_falls_back_to_classic() {
        let model = sample_model();
        let fallback = render(&model, "does-not-exist", RenderOptions::default()).unwrap();
        let classic = render(&model, "classic", RenderOptions::default()).unwrap();
        assert_eq!(fallback, classic);
        assert_eq!(fallback.template, TemplateId::Classic);
        assert_eq!(fallback.template_name, "Classic");
    }

    #[test]
    fn test_unknown_template_uses_configured_fallback() {
        let options = RenderOptions {
            fallback: TemplateId::Minimal,
            ..Default::default()
        };
        let doc = render(&sample_model(), "neon-glow", options).unwrap();
        assert_eq!(doc.template, TemplateId::Minimal);
        let known = render(&sample_model(), "modern", options).unwrap();
        assert_eq!(known.template, TemplateId::Modern);
    }

    #[test]
    fn test_premium_template_requires_upgrade() {
        let err = render(&sample_model(), "executive", RenderOptions::default()).unwrap_err();
        assert_eq!(
            err,
            RenderError::UpgradeRequired(UpgradeRequired {
                feature: PremiumFeature::Template(TemplateId::Executive)
            })
        );

        let mut model = sample_model();
        model.is_premium = true;
        let doc = render(&model, "executive", RenderOptions::default()).unwrap();
        assert_eq!(doc.sections[0].section, Section::Skills);
    }

    #[test]
    fn test_render_is_byte_identical() {
        let model = sample_model();
        let a = serde_json::to_vec(&render(&model, "modern", on()).unwrap()).unwrap();
        let b = serde_json::to_vec(&render(&model, "modern", on()).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_render_selected_uses_model_template() {
        let mut model = sample_model();
        model.selected_template = TemplateId::Minimal;
        let doc = render_selected(&model, RenderOptions::default()).unwrap();
        assert_eq!(doc.template, TemplateId::Minimal);
        assert_eq!(doc.accent, None);
    }

    #[test]
    fn test_plain_text_projection() {
        let text = render(&sample_model(), "classic", RenderOptions::default())
            .unwrap()
            .to_plain_text();
        assert!(text.starts_with("Jane Doe\nBackend Engineer\n"));
        assert!(text.contains("jane@x.com | 555-0100 | github.com/jane"));
        assert!(text.contains("EDUCATION\n- MIT, BSc in CS (2019 – 2023)"));
        assert!(text.contains("  Rust, Go"));
    }
}
