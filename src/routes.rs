use std::fmt;

use crate::models::Assignee;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Customers,
    Leads,
    Tasks(Assignee),
    Meetings,
    Users,
}

impl Section {
    pub const ALL: [Section; 6] = [
        Section::Customers,
        Section::Leads,
        Section::Tasks(Assignee::Vlada),
        Section::Tasks(Assignee::Peta),
        Section::Meetings,
        Section::Users,
    ];

    pub fn path(&self) -> String {
        match self {
            Section::Customers => "/customers".to_string(),
            Section::Leads => "/leads".to_string(),
            Section::Tasks(assignee) => format!("/tasks/{}", assignee.route_segment()),
            Section::Meetings => "/meetings".to_string(),
            Section::Users => "/users".to_string(),
        }
    }

    pub fn title(&self) -> String {
        match self {
            Section::Customers => "Customers".to_string(),
            Section::Leads => "Leads".to_string(),
            Section::Tasks(assignee) => format!("{}'s tasks", assignee.display_name()),
            Section::Meetings => "Meetings".to_string(),
            Section::Users => "Users".to_string(),
        }
    }
}

/// What a route points at inside its section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    List,
    New,
    /// Raw path parameter; the form decides whether it is a usable id.
    Record(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub section: Section,
    pub target: Target,
}

impl Route {
    pub fn list(section: Section) -> Self {
        Self { section, target: Target::List }
    }

    pub fn new_record(section: Section) -> Self {
        Self { section, target: Target::New }
    }

    pub fn record(section: Section, id: i64) -> Self {
        Self {
            section,
            target: Target::Record(id.to_string()),
        }
    }

    /// Parses `/customers`, `/customers/new`, `/tasks/petr/7` and the like.
    pub fn parse(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .trim()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let (section, rest) = match segments.as_slice() {
            ["customers", rest @ ..] => (Section::Customers, rest),
            ["leads", rest @ ..] => (Section::Leads, rest),
            ["meetings", rest @ ..] => (Section::Meetings, rest),
            ["users", rest @ ..] => (Section::Users, rest),
            ["tasks", who, rest @ ..] => (Section::Tasks(Assignee::from_route_segment(who)?), rest),
            _ => return None,
        };

        let target = match rest {
            [] => Target::List,
            ["new"] => Target::New,
            [param] => Target::Record(param.to_string()),
            _ => return None,
        };

        Some(Self { section, target })
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Target::List => write!(f, "{}", self.section.path()),
            Target::New => write!(f, "{}/new", self.section.path()),
            Target::Record(param) => write!(f, "{}/{}", self.section.path(), param),
        }
    }
}
