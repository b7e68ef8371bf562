//! Enumerations and field types for task tracking.
//!
//! The owning areas, priorities and statuses are closed sets: the dashboard
//! builds its legends and charts by iterating over `ALL`, so adding a variant
//! means adding it to the matching constant as well.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Organisational area that owns or supports a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Area {
    #[serde(alias = "Seguridad")]
    Seguridad,
    #[serde(alias = "Comunidades")]
    Comunidades,
    #[serde(alias = "Legal")]
    Legal,
    #[serde(alias = "Mantenimiento")]
    Mantenimiento,
    #[serde(alias = "Medio Ambiente")]
    MedioAmbiente,
    #[serde(alias = "Operaciones")]
    Operaciones,
    #[serde(alias = "Calidad")]
    Calidad,
    #[serde(alias = "Compras")]
    Compras,
}

impl Area {
    pub const ALL: [Area; 8] = [
        Area::Seguridad,
        Area::Comunidades,
        Area::Legal,
        Area::Mantenimiento,
        Area::MedioAmbiente,
        Area::Operaciones,
        Area::Calidad,
        Area::Compras,
    ];

    /// Display name of the area.
    pub fn label(self) -> &'static str {
        match self {
            Area::Seguridad => "Seguridad",
            Area::Comunidades => "Comunidades",
            Area::Legal => "Legal",
            Area::Mantenimiento => "Mantenimiento",
            Area::MedioAmbiente => "Medio Ambiente",
            Area::Operaciones => "Operaciones",
            Area::Calidad => "Calidad",
            Area::Compras => "Compras",
        }
    }

    /// Parse a display name or kebab-case name, ignoring case.
    pub fn parse(s: &str) -> Option<Area> {
        let needle = s.trim().to_lowercase().replace('-', " ").replace('_', " ");
        Area::ALL
            .into_iter()
            .find(|a| a.label().to_lowercase() == needle)
    }
}

/// Task priority. Declaration order is the rank used for sorting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Priority {
    #[serde(alias = "Alta", alias = "alta")]
    High,
    #[serde(alias = "Media", alias = "media")]
    Medium,
    #[serde(alias = "Baja", alias = "baja")]
    Low,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::High, Priority::Medium, Priority::Low];

    /// Sort rank: High=0, Medium=1, Low=2.
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

/// Lifecycle status derived from dates and progress.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[serde(alias = "Planificado")]
    Planned,
    #[serde(alias = "En curso")]
    InProgress,
    #[serde(alias = "Finalizado")]
    Finished,
    #[serde(alias = "Atrasado")]
    Overdue,
}

impl Status {
    pub const ALL: [Status; 4] = [Status::Planned, Status::InProgress, Status::Finished, Status::Overdue];

    /// List sort rank: Overdue=0, InProgress=1, Finished=2, Planned=3.
    pub fn sort_rank(self) -> u8 {
        match self {
            Status::Overdue => 0,
            Status::InProgress => 1,
            Status::Finished => 2,
            Status::Planned => 3,
        }
    }
}

/// Kind of alert raised for a task.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum NotificationKind {
    Overdue,
    DueSoon,
    /// Never produced by the generator; kept so consumers can match on it.
    Completed,
}

impl NotificationKind {
    /// Stable suffix used to build deterministic notification ids.
    pub fn id_suffix(self) -> &'static str {
        match self {
            NotificationKind::Overdue => "overdue",
            NotificationKind::DueSoon => "due-soon",
            NotificationKind::Completed => "completed",
        }
    }
}

/// Role toggle of the dashboard user. Not an access-control mechanism.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Role {
    Admin,
    User,
}

/// Who is looking at the dashboard. Selects which tasks count as "mine"
/// and how new tasks are labelled; grants nothing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerContext {
    Administrator,
    AreaUser(Area),
}

impl ViewerContext {
    pub fn from_role(role: Role, area: Area) -> Self {
        match role {
            Role::Admin => ViewerContext::Administrator,
            Role::User => ViewerContext::AreaUser(area),
        }
    }

    /// Label stamped on tasks created by this viewer.
    pub fn creator_label(&self) -> String {
        match self {
            ViewerContext::Administrator => "Admin".to_string(),
            ViewerContext::AreaUser(area) => area.label().to_string(),
        }
    }

    pub fn area(&self) -> Option<Area> {
        match self {
            ViewerContext::Administrator => None,
            ViewerContext::AreaUser(area) => Some(*area),
        }
    }
}

/// Sortable columns of the task list.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum SortField {
    Name,
    Status,
    Progress,
    EndDate,
    Priority,
}

impl SortField {
    pub const ALL: [SortField; 5] = [
        SortField::Name,
        SortField::Status,
        SortField::Progress,
        SortField::EndDate,
        SortField::Priority,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}
