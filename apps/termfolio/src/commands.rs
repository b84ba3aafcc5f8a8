//! Capability resolution: which terminal commands the current resume supports.
//!
//! The catalog is fixed and ordered. A command is either always available or
//! backed by a section, in which case it appears only while that section has
//! at least one visible record (`basic` needs both a name and an email).

use serde::Serialize;

use crate::resume::{Document, SectionId};

/// Placeholder used in descriptions when the resume carries no name.
const ANONYMOUS: &str = "User";

#[derive(Debug, Clone, Copy)]
enum Availability {
    Always,
    Section(SectionId),
}

#[derive(Debug, Clone, Copy)]
struct CommandDef {
    cmd: &'static str,
    /// Empty when the description is synthesized from the resume identity.
    desc: &'static str,
    availability: Availability,
}

const fn always(cmd: &'static str, desc: &'static str) -> CommandDef {
    CommandDef {
        cmd,
        desc,
        availability: Availability::Always,
    }
}

const fn backed(cmd: &'static str, section: SectionId) -> CommandDef {
    CommandDef {
        cmd,
        desc: "",
        availability: Availability::Section(section),
    }
}

/// Static commands first, then the resume-driven ones.
const CATALOG: &[CommandDef] = &[
    always("clear", "clear the terminal"),
    always("echo", "print out anything"),
    backed("email", SectionId::Basic),
    always("gui", "go to my portfolio in GUI"),
    always("help", "check available commands"),
    always("history", "view command history"),
    always("pwd", "print current working directory"),
    always("themes", "check available themes"),
    always("welcome", "display hero section"),
    always("whoami", "about current user"),
    backed("about", SectionId::Basic),
    backed("awards", SectionId::Awards),
    backed("cv", SectionId::Basic),
    backed("download-cv", SectionId::Basic),
    backed("education", SectionId::Education),
    backed("experience", SectionId::Experience),
    backed("professional", SectionId::ProfessionalDevelopment),
    backed("projects", SectionId::Projects),
    backed("publications", SectionId::Publications),
    backed("socials", SectionId::Basic),
    backed("volunteer", SectionId::Volunteer),
];

/// One resolved row of the command table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    pub cmd: String,
    pub desc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<SectionId>,
    pub always_available: bool,
}

/// Resolves the command table for `document`, or the static subset when no
/// document is available. Order follows the catalog.
pub fn resolve_commands(document: Option<&Document>) -> Vec<CommandDescriptor> {
    CATALOG
        .iter()
        .filter_map(|def| {
            let (section, always_available) = match def.availability {
                Availability::Always => (None, true),
                Availability::Section(section) => {
                    if !document.is_some_and(|d| d.has_section(section)) {
                        return None;
                    }
                    (Some(section), false)
                }
            };
            Some(CommandDescriptor {
                cmd: def.cmd.to_string(),
                desc: describe(def, document),
                section,
                always_available,
            })
        })
        .collect()
}

pub fn has_command(commands: &[CommandDescriptor], cmd: &str) -> bool {
    commands.iter().any(|c| c.cmd == cmd)
}

fn describe(def: &CommandDef, document: Option<&Document>) -> String {
    if !def.desc.is_empty() {
        return def.desc.to_string();
    }
    let Some(document) = document else {
        return String::new();
    };

    let name = match document.name.trim() {
        "" => ANONYMOUS,
        name => name,
    };
    let first = document.first_name().unwrap_or(ANONYMOUS);

    match def.cmd {
        "about" => format!("about {name}"),
        "cv" => format!("view {first}'s CV overview"),
        "download-cv" => format!("download {name}'s CV (PDF)"),
        "socials" => format!("check out {first}'s social accounts"),
        "email" => format!("send an email to {first}"),
        "experience" => format!("view {first}'s work experience"),
        "education" => format!("view {first}'s education background"),
        "projects" => format!("view projects {first} has coded"),
        "volunteer" => format!("view {first}'s volunteer experience"),
        "awards" => format!("view {first}'s awards and achievements"),
        "publications" => format!("view {first}'s published research papers"),
        "professional" => format!("view {first}'s professional development"),
        _ => String::new(),
    }
}
