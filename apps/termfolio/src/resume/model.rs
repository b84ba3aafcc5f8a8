use serde::{Deserialize, Serialize};

use crate::resume::format::format_date_range;

/// The canonical, normalized resume. Nothing in here is hidden and every
/// experience row is already flattened.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub location: String,
    pub email: String,
    pub phone: String,
    pub website: String,
    pub social: Vec<SocialLink>,
    pub sections: Sections,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sections {
    pub experience: Vec<ExperienceRow>,
    pub education: Vec<Education>,
    pub volunteer: Vec<Volunteer>,
    pub projects: Vec<Project>,
    pub awards: Vec<Award>,
    pub presentations: Vec<Presentation>,
    pub publications: Vec<Publication>,
    pub professional_development: Vec<ProfessionalDevelopment>,
    pub certifications_and_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SocialLink {
    pub network: String,
    pub username: String,
    pub url: String,
}

/// One displayable experience row. Multi-position employers expand into one
/// row per position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperienceRow {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub show_company_header: bool,
    pub show_date_in_position: bool,
    pub spacing_after: Option<String>,
    pub highlights: Vec<String>,
}

impl ExperienceRow {
    pub fn date_range(&self) -> String {
        format_date_range(&self.start_date, &self.end_date)
    }

    /// `company | location | Jan 2020 - Present`
    pub fn summary_line(&self) -> String {
        format!("{} | {} | {}", self.company, self.location, self.date_range())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub institution: String,
    pub area: String,
    pub degree: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volunteer {
    pub company: String,
    pub position: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub title: String,
    pub description: String,
    pub link: String,
    pub technologies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Award {
    pub name: String,
    pub date: String,
    pub summary: String,
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub name: String,
    pub summary: String,
    pub location: String,
    pub date: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub title: String,
    pub authors: Vec<String>,
    pub journal: String,
    pub date: String,
    pub doi: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfessionalDevelopment {
    pub name: String,
    pub location: String,
    pub date: String,
    pub summary: String,
}

/// Identifies a section of the [`Document`], plus the `basic` identity
/// pseudo-section used by capability resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionId {
    Basic,
    Experience,
    Education,
    Volunteer,
    Projects,
    Awards,
    Presentations,
    Publications,
    ProfessionalDevelopment,
    CertificationsAndSkills,
}

impl SectionId {
    pub const ALL: [SectionId; 10] = [
        SectionId::Basic,
        SectionId::Experience,
        SectionId::Education,
        SectionId::Volunteer,
        SectionId::Projects,
        SectionId::Awards,
        SectionId::Presentations,
        SectionId::Publications,
        SectionId::ProfessionalDevelopment,
        SectionId::CertificationsAndSkills,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionId::Basic => "basic",
            SectionId::Experience => "experience",
            SectionId::Education => "education",
            SectionId::Volunteer => "volunteer",
            SectionId::Projects => "projects",
            SectionId::Awards => "awards",
            SectionId::Presentations => "presentations",
            SectionId::Publications => "publications",
            SectionId::ProfessionalDevelopment => "professional_development",
            SectionId::CertificationsAndSkills => "certifications_and_skills",
        }
    }

    pub fn parse(name: &str) -> Option<SectionId> {
        SectionId::ALL.into_iter().find(|s| s.as_str() == name)
    }
}

impl Document {
    /// Placeholder document substituted when nothing could be resolved.
    pub fn minimal() -> Self {
        Document {
            name: "Your Name".to_string(),
            location: "Earth".to_string(),
            email: "hello@example.com".to_string(),
            phone: String::new(),
            website: "https://example.com".to_string(),
            social: Vec::new(),
            sections: Sections::default(),
        }
    }

    pub fn first_name(&self) -> Option<&str> {
        self.name.split_whitespace().next()
    }

    /// Both a name and an email are required for the identity pseudo-section.
    pub fn has_identity(&self) -> bool {
        !self.name.trim().is_empty() && !self.email.trim().is_empty()
    }

    /// Number of records in a section. `basic` counts as one when the
    /// identity is complete.
    pub fn section_len(&self, section: SectionId) -> usize {
        let s = &self.sections;
        match section {
            SectionId::Basic => usize::from(self.has_identity()),
            SectionId::Experience => s.experience.len(),
            SectionId::Education => s.education.len(),
            SectionId::Volunteer => s.volunteer.len(),
            SectionId::Projects => s.projects.len(),
            SectionId::Awards => s.awards.len(),
            SectionId::Presentations => s.presentations.len(),
            SectionId::Publications => s.publications.len(),
            SectionId::ProfessionalDevelopment => s.professional_development.len(),
            SectionId::CertificationsAndSkills => s.certifications_and_skills.len(),
        }
    }

    pub fn has_section(&self, section: SectionId) -> bool {
        self.section_len(section) > 0
    }

    /// Serializes one section for consumers that only need that slice.
    pub fn section_json(&self, section: SectionId) -> serde_json::Result<serde_json::Value> {
        let s = &self.sections;
        match section {
            SectionId::Basic => Ok(serde_json::json!({
                "name": self.name,
                "location": self.location,
                "email": self.email,
                "phone": self.phone,
                "website": self.website,
                "social": self.social,
            })),
            SectionId::Experience => serde_json::to_value(&s.experience),
            SectionId::Education => serde_json::to_value(&s.education),
            SectionId::Volunteer => serde_json::to_value(&s.volunteer),
            SectionId::Projects => serde_json::to_value(&s.projects),
            SectionId::Awards => serde_json::to_value(&s.awards),
            SectionId::Presentations => serde_json::to_value(&s.presentations),
            SectionId::Publications => serde_json::to_value(&s.publications),
            SectionId::ProfessionalDevelopment => serde_json::to_value(&s.professional_development),
            SectionId::CertificationsAndSkills => serde_json::to_value(&s.certifications_and_skills),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_document_has_identity_and_no_sections() {
        let doc = Document::minimal();
        assert!(doc.has_identity());
        for section in SectionId::ALL {
            if section != SectionId::Basic {
                assert_eq!(doc.section_len(section), 0, "{}", section.as_str());
            }
        }
    }

    #[test]
    fn test_identity_requires_name_and_email() {
        let mut doc = Document::minimal();
        doc.email = "  ".to_string();
        assert!(!doc.has_identity());
        assert!(!doc.has_section(SectionId::Basic));
    }

    #[test]
    fn test_section_id_round_trips_through_name() {
        for section in SectionId::ALL {
            assert_eq!(SectionId::parse(section.as_str()), Some(section));
        }
        assert_eq!(SectionId::parse("hobbies"), None);
    }

    #[test]
    fn test_summary_line_formats_dates() {
        let row = ExperienceRow {
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            start_date: "2021-03".to_string(),
            end_date: "present".to_string(),
            ..Default::default()
        };
        assert_eq!(row.summary_line(), "Acme | Remote | Mar 2021 - Present");
    }
}
