//! Static template catalogue for the preview renderer.
//!
//! A template fixes the order sections appear in, how their headings are
//! cased, the accent colour, and how skills are laid out. Two templates are
//! premium-only.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::models::document::Section;

// ────────────────────────────────────────────────────────────────────────────
// Template ids
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateId {
    /// Single-column, ATS-safe.
    #[default]
    Classic,
    /// Accent header bar, skills as chips.
    Modern,
    /// No accent, tight spacing.
    Minimal,
    /// Experience-first layout. Premium.
    Executive,
    /// Projects-first layout with coloured headings. Premium.
    Creative,
}

impl TemplateId {
    pub const ALL: [TemplateId; 5] = [
        TemplateId::Classic,
        TemplateId::Modern,
        TemplateId::Minimal,
        TemplateId::Executive,
        TemplateId::Creative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateId::Classic => "classic",
            TemplateId::Modern => "modern",
            TemplateId::Minimal => "minimal",
            TemplateId::Executive => "executive",
            TemplateId::Creative => "creative",
        }
    }

    pub fn template(&self) -> &'static Template {
        match self {
            TemplateId::Classic => &CLASSIC,
            TemplateId::Modern => &MODERN,
            TemplateId::Minimal => &MINIMAL,
            TemplateId::Executive => &EXECUTIVE,
            TemplateId::Creative => &CREATIVE,
        }
    }

    pub fn is_premium(&self) -> bool {
        self.template().is_premium
    }

    /// Whether this template may be used under the given plan tier.
    pub fn is_selectable(&self, is_premium: bool) -> bool {
        is_premium || !self.is_premium()
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown template '{0}'")]
pub struct UnknownTemplate(pub String);

impl FromStr for TemplateId {
    type Err = UnknownTemplate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        TemplateId::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| UnknownTemplate(s.to_string()))
    }
}

/// Resolves a template id string, substituting `fallback` for anything not
/// in the catalogue.
pub fn resolve_template(template_id: &str, fallback: TemplateId) -> TemplateId {
    template_id.parse().unwrap_or(fallback)
}

// ────────────────────────────────────────────────────────────────────────────
// Template definitions
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingStyle {
    Uppercase,
    TitleCase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillsLayout {
    /// One comma-separated line per category.
    Inline,
    /// One item per skill with its proficiency level.
    Chips,
}

#[derive(Debug)]
pub struct Template {
    pub id: TemplateId,
    pub display_name: &'static str,
    pub is_premium: bool,
    /// Hex colour used for headings and rules; `None` renders monochrome.
    pub accent: Option<&'static str>,
    pub heading_style: HeadingStyle,
    pub skills_layout: SkillsLayout,
    /// Body sections in display order. Personal info always renders as the header.
    pub section_order: &'static [Section],
}

const STANDARD_ORDER: &[Section] = &[
    Section::Education,
    Section::Skills,
    Section::Internships,
    Section::Projects,
    Section::Certifications,
    Section::Hackathons,
    Section::Achievements,
    Section::Languages,
];

const EXPERIENCE_FIRST_ORDER: &[Section] = &[
    Section::Internships,
    Section::Projects,
    Section::Skills,
    Section::Education,
    Section::Certifications,
    Section::Achievements,
    Section::Hackathons,
    Section::Languages,
];

const PROJECTS_FIRST_ORDER: &[Section] = &[
    Section::Projects,
    Section::Hackathons,
    Section::Skills,
    Section::Internships,
    Section::Education,
    Section::Achievements,
    Section::Certifications,
    Section::Languages,
];

static CLASSIC: Template = Template {
    id: TemplateId::Classic,
    display_name: "Classic",
    is_premium: false,
    accent: None,
    heading_style: HeadingStyle::Uppercase,
    skills_layout: SkillsLayout::Inline,
    section_order: STANDARD_ORDER,
};

static MODERN: Template = Template {
    id: TemplateId::Modern,
    display_name: "Modern",
    is_premium: false,
    accent: Some("#2563eb"),
    heading_style: HeadingStyle::TitleCase,
    skills_layout: SkillsLayout::Chips,
    section_order: STANDARD_ORDER,
};

static MINIMAL: Template = Template {
    id: TemplateId::Minimal,
    display_name: "Minimal",
    is_premium: false,
    accent: None,
    heading_style: HeadingStyle::TitleCase,
    skills_layout: SkillsLayout::Inline,
    section_order: STANDARD_ORDER,
};

static EXECUTIVE: Template = Template {
    id: TemplateId::Executive,
    display_name: "Executive",
    is_premium: true,
    accent: Some("#1f2937"),
    heading_style: HeadingStyle::Uppercase,
    skills_layout: SkillsLayout::Inline,
    section_order: EXPERIENCE_FIRST_ORDER,
};

static CREATIVE: Template = Template {
    id: TemplateId::Creative,
    display_name: "Creative",
    is_premium: true,
    accent: Some("#db2777"),
    heading_style: HeadingStyle::TitleCase,
    skills_layout: SkillsLayout::Chips,
    section_order: PROJECTS_FIRST_ORDER,
};

impl Template {
    /// Heading shown above a body section, cased for this template.
    pub fn section_title(&self, section: Section) -> String {
        let title = match (self.id, section) {
            (TemplateId::Executive, Section::Internships) => "Professional Experience",
            (_, Section::Internships) => "Internships",
            (_, Section::Education) => "Education",
            (_, Section::Skills) => "Skills",
            (_, Section::Projects) => "Projects",
            (_, Section::Certifications) => "Certifications",
            (_, Section::Hackathons) => "Hackathons",
            (_, Section::Achievements) => "Achievements",
            (_, Section::Languages) => "Languages",
            (_, Section::PersonalInfo) => "Personal Information",
            (_, Section::SelectedJobRole) => "Target Role",
            (_, Section::SelectedTemplate) => "Template",
            (_, Section::Roadmap) => "Roadmap",
        };
        match self.heading_style {
            HeadingStyle::Uppercase => title.to_uppercase(),
            HeadingStyle::TitleCase => title.to_string(),
        }
    }
}
