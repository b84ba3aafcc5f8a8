//! Raw document -> canonical [`Document`].
//!
//! Steps, in order:
//! 1. parse YAML into an untyped tree, then into the raw shapes
//! 2. drop every record whose `visible` flag is explicitly false
//! 3. reconcile legacy/current highlight fields per record
//! 4. flatten grouped experience records into one row per position
//! 5. resolve the certifications alias

use serde_yaml::Value;
use tracing::{debug, warn};

use crate::resume::model::{
    Award, Document, Education, ExperienceRow, Presentation, ProfessionalDevelopment, Project,
    Publication, Sections, SocialLink, Volunteer,
};
use crate::resume::raw::{
    Hideable, RawExperience, RawGroupedExperience, RawLegacyExperience, RawRoot, RawSections,
};
use crate::resume::ResumeError;

/// Parses and normalizes a resume document. A malformed document is an
/// error; no partial document is ever returned.
pub fn normalize_document(source: &str) -> Result<Document, ResumeError> {
    let tree: Value = serde_yaml::from_str(source).map_err(ResumeError::Parse)?;
    let root: RawRoot = serde_yaml::from_value(tree).map_err(ResumeError::Parse)?;
    let cv = root.cv;

    let document = Document {
        name: cv.name.trim().to_string(),
        location: cv.location,
        email: cv.email.trim().to_string(),
        phone: cv.phone,
        website: cv.website.trim().to_string(),
        social: cv
            .social
            .into_iter()
            .map(|s| SocialLink {
                network: s.network,
                username: s.username,
                url: s.url,
            })
            .collect(),
        sections: normalize_sections(cv.sections),
    };

    if !document.has_identity() {
        warn!("resume document is missing a name or email; identity commands will be hidden");
    }
    debug!(
        experience = document.sections.experience.len(),
        education = document.sections.education.len(),
        awards = document.sections.awards.len(),
        "normalized resume document"
    );

    Ok(document)
}

fn normalize_sections(raw: RawSections) -> Sections {
    Sections {
        experience: flatten_experience(visible(raw.experience)),
        education: visible(raw.education)
            .into_iter()
            .map(|e| Education {
                institution: e.institution,
                area: e.area,
                degree: e.degree,
                location: e.location,
                start_date: e.start_date,
                end_date: e.end_date,
                highlights: reconcile_highlights(e.highlights, e.details),
            })
            .collect(),
        volunteer: visible(raw.volunteer)
            .into_iter()
            .map(|v| Volunteer {
                company: v.company,
                position: v.position,
                location: v.location,
                start_date: v.start_date,
                end_date: v.end_date,
                highlights: reconcile_highlights(v.highlights, v.details),
            })
            .collect(),
        projects: visible(raw.projects)
            .into_iter()
            .map(|p| Project {
                title: p.title,
                description: p.description,
                link: p.link,
                technologies: p.technologies,
            })
            .collect(),
        awards: visible(raw.awards)
            .into_iter()
            .map(|a| Award {
                name: a.name,
                date: a.date,
                summary: a.summary,
                highlights: reconcile_highlights(a.highlights, a.details),
            })
            .collect(),
        presentations: visible(raw.presentations)
            .into_iter()
            .map(|p| Presentation {
                name: p.name,
                summary: p.summary,
                location: p.location,
                date: p.date,
            })
            .collect(),
        publications: visible(raw.publications)
            .into_iter()
            .map(|p| Publication {
                title: p.title,
                authors: p.authors,
                journal: p.journal,
                date: p.date,
                doi: p.doi,
            })
            .collect(),
        professional_development: visible(raw.professional_development)
            .into_iter()
            .map(|p| ProfessionalDevelopment {
                name: p.name,
                location: p.location,
                date: p.date,
                summary: p.summary,
            })
            .collect(),
        certifications_and_skills: raw
            .certifications_and_skills
            .or(raw.certifications_skills)
            .unwrap_or_default(),
    }
}

fn visible<T: Hideable>(records: Vec<T>) -> Vec<T> {
    let before = records.len();
    let kept: Vec<T> = records.into_iter().filter(Hideable::is_visible).collect();
    if kept.len() != before {
        debug!("dropped {} hidden record(s)", before - kept.len());
    }
    kept
}

/// The legacy `highlights` list wins verbatim; `details` is only used when
/// `highlights` is absent.
fn reconcile_highlights(legacy: Option<Vec<String>>, current: Option<Vec<String>>) -> Vec<String> {
    legacy.or(current).unwrap_or_default()
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Expands grouped records into one row per position and fills blank
/// company names from the nearest preceding row that has one.
fn flatten_experience(records: Vec<RawExperience>) -> Vec<ExperienceRow> {
    let mut rows: Vec<ExperienceRow> = Vec::new();

    for record in records {
        let start = rows.len();
        match record {
            RawExperience::Legacy(legacy) => rows.extend(legacy_row(legacy)),
            RawExperience::Grouped(group) => rows.extend(group_rows(group)),
        }

        for i in start..rows.len() {
            if is_blank(&rows[i].company) {
                if let Some(company) = rows[..i].iter().rev().find(|r| !is_blank(&r.company)) {
                    rows[i].company = company.company.clone();
                    // Continuation of the previous employer.
                    rows[i].show_company_header = false;
                }
            }
        }
    }

    rows
}

fn legacy_row(legacy: RawLegacyExperience) -> Option<ExperienceRow> {
    if is_blank(&legacy.position) || is_blank(&legacy.start_date) || is_blank(&legacy.end_date) {
        warn!(
            company = %legacy.company,
            "skipping experience entry without a title or date range"
        );
        return None;
    }

    Some(ExperienceRow {
        company: legacy.company,
        position: legacy.position,
        location: legacy.location,
        start_date: legacy.start_date,
        end_date: legacy.end_date,
        show_company_header: legacy.show_company_header.unwrap_or(true),
        show_date_in_position: legacy.show_date_in_position.unwrap_or(false),
        spacing_after: legacy.spacing_after,
        highlights: reconcile_highlights(legacy.highlights, legacy.details),
    })
}

fn group_rows(group: RawGroupedExperience) -> Vec<ExperienceRow> {
    let usable: Vec<_> = group
        .positions
        .into_iter()
        .filter(Hideable::is_visible)
        .filter(|p| !is_blank(&p.title) && !is_blank(&p.start_date) && !is_blank(&p.end_date))
        .collect();

    if usable.is_empty() {
        warn!(company = %group.company, "experience group has no usable positions");
        return Vec::new();
    }

    let last = usable.len() - 1;
    usable
        .into_iter()
        .enumerate()
        .map(|(i, position)| ExperienceRow {
            company: group.company.clone(),
            position: position.title,
            location: group.location.clone(),
            start_date: position.start_date,
            end_date: position.end_date,
            show_company_header: i == 0 && group.show_company_header.unwrap_or(true),
            // Grouped roles always show their own dates.
            show_date_in_position: position.show_date_in_position.unwrap_or(true),
            spacing_after: if i == last {
                group.spacing_after.clone()
            } else {
                None
            },
            highlights: reconcile_highlights(position.highlights, position.details),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(sections: &str) -> String {
        format!(
            "cv:\n  name: Jane Doe\n  email: jane@example.com\n  website: https://jane.dev\n  sections:\n{sections}"
        )
    }

    #[test]
    fn test_scenario_legacy_and_grouped_experience() {
        let source = doc(r#"
    experience:
      - company: Startup
        position: Intern
        location: Vancouver
        start_date: 2020-01
        end_date: 2020-06
        highlights: [Shipped a thing]
      - company: Acme
        location: Toronto
        positions:
          - title: Engineer
            start_date: 2020-07
            end_date: 2022-01
          - title: Senior Engineer
            start_date: 2022-01
            end_date: present
"#);
        let document = normalize_document(&source).unwrap();
        let rows = &document.sections.experience;
        assert_eq!(rows.len(), 3);

        assert_eq!(rows[0].position, "Intern");
        assert_eq!(rows[0].start_date, "2020-01");
        assert_eq!(rows[0].end_date, "2020-06");
        assert_eq!(rows[0].highlights, vec!["Shipped a thing"]);

        assert_eq!(rows[1].company, "Acme");
        assert_eq!(rows[1].location, "Toronto");
        assert!(rows[1].show_company_header);
        assert_eq!(rows[2].company, "Acme");
        assert_eq!(rows[2].location, "Toronto");
        assert!(!rows[2].show_company_header);
    }

    #[test]
    fn test_group_with_n_positions_yields_n_rows() {
        let source = doc(r#"
    experience:
      - company: Globex
        location: Springfield
        show_company_header: false
        spacing_after: 1em
        positions:
          - { title: A, start_date: 2019-01, end_date: 2019-06 }
          - { title: B, start_date: 2019-06, end_date: 2020-01 }
          - { title: C, start_date: 2020-01, end_date: present }
"#);
        let rows = normalize_document(&source).unwrap().sections.experience;
        assert_eq!(rows.len(), 3);
        assert!(rows.iter().all(|r| r.company == "Globex" && r.location == "Springfield"));
        // explicit parent value honoured on the first row only
        assert!(!rows[0].show_company_header);
        assert!(!rows[1].show_company_header);
        assert!(!rows[2].show_company_header);
        assert_eq!(rows[0].spacing_after, None);
        assert_eq!(rows[1].spacing_after, None);
        assert_eq!(rows[2].spacing_after.as_deref(), Some("1em"));
    }

    #[test]
    fn test_unusable_positions_are_skipped() {
        let source = doc(r#"
    experience:
      - company: Initech
        spacing_after: 2em
        positions:
          - { title: Analyst, start_date: 2018-01, end_date: 2018-12 }
          - { title: "", start_date: 2019-01, end_date: 2019-12 }
          - { title: Lead, start_date: 2019-01 }
      - company: Hooli
        positions:
          - { start_date: 2017-01, end_date: 2017-06 }
"#);
        let rows = normalize_document(&source).unwrap().sections.experience;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].position, "Analyst");
        assert!(rows[0].show_company_header);
        // the only emitted row is also the last one
        assert_eq!(rows[0].spacing_after.as_deref(), Some("2em"));
    }

    #[test]
    fn test_blank_company_inherits_nearest_preceding() {
        let source = doc(r#"
    experience:
      - { company: First, position: One, start_date: 2015-01, end_date: 2016-01 }
      - { company: Second, position: Two, start_date: 2016-01, end_date: 2017-01 }
      - { company: "", position: Three, start_date: 2017-01, end_date: 2018-01 }
      - { position: Four, start_date: 2018-01, end_date: 2019-01 }
"#);
        let rows = normalize_document(&source).unwrap().sections.experience;
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2].company, "Second");
        assert_eq!(rows[3].company, "Second");
        assert!(rows[1].show_company_header);
        assert!(!rows[2].show_company_header);
        assert!(!rows[3].show_company_header);
    }

    #[test]
    fn test_inherited_company_does_not_repeat_header() {
        let source = doc(r#"
    experience:
      - { company: Acme, position: A, start_date: 2015-01, end_date: 2016-01 }
      - { company: "", position: B, start_date: 2016-01, end_date: 2017-01 }
"#);
        let rows = normalize_document(&source).unwrap().sections.experience;
        let headers: Vec<_> = rows
            .iter()
            .map(|r| (r.company.as_str(), r.show_company_header))
            .collect();
        assert_eq!(headers, vec![("Acme", true), ("Acme", false)]);
    }

    #[test]
    fn test_blank_company_without_predecessor_stays_blank() {
        let source = doc(r#"
    experience:
      - { position: Solo, start_date: 2015-01, end_date: 2016-01 }
"#);
        let rows = normalize_document(&source).unwrap().sections.experience;
        assert_eq!(rows[0].company, "");
    }

    #[test]
    fn test_legacy_row_without_dates_is_dropped() {
        let source = doc(r#"
    experience:
      - { company: Nowhere, position: Ghost, start_date: 2015-01 }
      - { company: Somewhere, start_date: 2015-01, end_date: 2016-01 }
"#);
        assert!(normalize_document(&source).unwrap().sections.experience.is_empty());
    }

    #[test]
    fn test_hidden_records_never_survive() {
        let source = doc(r#"
    experience:
      - { company: Hidden Co, position: X, start_date: 2015-01, end_date: 2016-01, visible: false }
      - company: Shown Co
        positions:
          - { title: Kept, start_date: 2016-01, end_date: 2017-01 }
          - { title: Secret, start_date: 2017-01, end_date: 2018-01, visible: false }
      - company: Hidden Group
        visible: false
        positions:
          - { title: Y, start_date: 2016-01, end_date: 2017-01 }
    education:
      - { institution: U1, visible: false }
      - { institution: U2, visible: true }
    volunteer:
      - { company: V1, visible: false }
    projects:
      - { title: P1, visible: false }
      - { title: P2 }
    awards:
      - { name: A1, visible: false }
    presentations:
      - { name: T1, visible: false }
    publications:
      - { title: Pub1, visible: false }
    professional_development:
      - { name: Course, visible: false }
"#);
        let document = normalize_document(&source).unwrap();
        let s = &document.sections;
        assert_eq!(s.experience.len(), 1);
        assert_eq!(s.experience[0].position, "Kept");
        assert_eq!(s.education.len(), 1);
        assert_eq!(s.education[0].institution, "U2");
        assert!(s.volunteer.is_empty());
        assert_eq!(s.projects.len(), 1);
        assert!(s.awards.is_empty());
        assert!(s.presentations.is_empty());
        assert!(s.publications.is_empty());
        assert!(s.professional_development.is_empty());
    }

    #[test]
    fn test_hidden_award_leaves_the_others() {
        let source = doc(r#"
    awards:
      - { name: Dean's List, date: 2019-05, visible: false }
      - { name: Best Paper, date: 2021-09 }
"#);
        let awards = normalize_document(&source).unwrap().sections.awards;
        assert_eq!(awards.len(), 1);
        assert_eq!(awards[0].name, "Best Paper");
    }

    #[test]
    fn test_legacy_highlights_win_over_details() {
        let source = doc(r#"
    awards:
      - { name: Both, highlights: [legacy], details: [current] }
      - { name: OnlyCurrent, details: [current] }
      - { name: Neither }
"#);
        let awards = normalize_document(&source).unwrap().sections.awards;
        assert_eq!(awards[0].highlights, vec!["legacy"]);
        assert_eq!(awards[1].highlights, vec!["current"]);
        assert!(awards[2].highlights.is_empty());
    }

    #[test]
    fn test_certifications_alias_resolves_identically() {
        let canonical = doc("    certifications_and_skills: [Rust, AWS SAA]\n");
        let alias = doc("    certifications_skills: [Rust, AWS SAA]\n");
        assert_eq!(
            normalize_document(&canonical).unwrap(),
            normalize_document(&alias).unwrap()
        );
    }

    #[test]
    fn test_canonical_certifications_name_is_preferred() {
        let both = doc("    certifications_and_skills: [Canonical]\n    certifications_skills: [Alias]\n");
        let certs = normalize_document(&both).unwrap().sections.certifications_and_skills;
        assert_eq!(certs, vec!["Canonical"]);
    }

    #[test]
    fn test_numeric_scalars_become_strings() {
        let source = doc(r#"
    education:
      - { institution: MIT, start_date: 2014, end_date: 2018 }
    publications:
      - { title: Paper, date: 2020, authors: [A. Author, 42] }
"#);
        let document = normalize_document(&source).unwrap();
        assert_eq!(document.sections.education[0].start_date, "2014");
        assert_eq!(document.sections.publications[0].authors, vec!["A. Author", "42"]);
    }

    #[test]
    fn test_missing_sections_and_null_sections_are_empty() {
        let source = "cv:\n  name: Jane\n  email: j@x.io\n  sections:\n    awards: ~\n";
        let document = normalize_document(source).unwrap();
        assert!(document.sections.awards.is_empty());
        assert!(document.sections.experience.is_empty());
        assert!(document.social.is_empty());
    }

    #[test]
    fn test_malformed_yaml_is_a_parse_error() {
        let err = normalize_document("cv: [unclosed").unwrap_err();
        assert!(matches!(err, ResumeError::Parse(_)));
    }

    #[test]
    fn test_missing_cv_root_is_a_parse_error() {
        let err = normalize_document("resume:\n  name: Jane\n").unwrap_err();
        assert!(matches!(err, ResumeError::Parse(_)));
    }

    #[test]
    fn test_missing_email_is_not_fatal() {
        let document = normalize_document("cv:\n  name: Jane Doe\n").unwrap();
        assert!(!document.has_identity());
    }

    #[test]
    fn test_normalizing_twice_is_idempotent() {
        let source = doc(r#"
    experience:
      - company: Acme
        positions:
          - { title: Engineer, start_date: 2020-07, end_date: present }
    awards:
      - { name: Prize, date: 2021-01 }
"#);
        assert_eq!(
            normalize_document(&source).unwrap(),
            normalize_document(&source).unwrap()
        );
    }

    #[test]
    fn test_bundled_fallback_resume_normalizes() {
        let document = normalize_document(include_str!("../../resume/CV.yaml")).unwrap();
        assert!(document.has_identity());

        let rows = &document.sections.experience;
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].company, "Example Corp");
        assert!(!rows[1].show_company_header);
        assert_eq!(rows[1].spacing_after.as_deref(), Some("1em"));
        assert_eq!(rows[0].highlights, vec!["Leads the platform team"]);
        assert_eq!(rows[2].position, "Intern");

        assert!(document.sections.awards.is_empty());
        assert_eq!(document.sections.certifications_and_skills.len(), 1);
    }
}
