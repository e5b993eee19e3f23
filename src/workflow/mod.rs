// Shelter Admin - Administrative core for an animal-shelter platform
// Copyright (C) 2025 Shelter Admin Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Status workflow shared by every domain object
//!
//! Each status type declares the states it may move to next. The UI asks for
//! that list to disable invalid options, and the core checks every status
//! change against it before anything is sent to the backend.

use serde::Serialize;

use crate::error::ApiError;
use crate::models::{AnimalState, ApplicationStatus, ReportStatus, SponsorshipStatus, WireStatus};

/// A status with a fixed set of legal successors
pub trait Workflow: WireStatus + std::fmt::Display + 'static {
    /// States reachable in one step. Staying in the same state is always
    /// allowed and is not listed.
    fn allowed_next(self) -> &'static [Self];

    /// Whether moving into this state needs a written observation
    fn requires_observation(self) -> bool {
        false
    }

    /// Label shown to staff
    fn label(self) -> &'static str;

    fn is_terminal(self) -> bool {
        self.allowed_next().is_empty()
    }

    fn can_transition_to(self, to: Self) -> bool {
        to != Self::UNKNOWN && (self == to || self.allowed_next().contains(&to))
    }
}

/// Check a status change, including the observation requirement
pub fn check_transition<S: Workflow>(
    from: S,
    to: S,
    observations: Option<&str>,
) -> Result<(), ApiError> {
    if !from.can_transition_to(to) {
        return Err(ApiError::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        });
    }

    let has_text = observations.map(str::trim).is_some_and(|o| !o.is_empty());
    if from != to && to.requires_observation() && !has_text {
        return Err(ApiError::Validation(format!(
            "Indica el motivo para pasar a {}",
            to.label()
        )));
    }

    Ok(())
}

impl Workflow for ApplicationStatus {
    fn allowed_next(self) -> &'static [Self] {
        use ApplicationStatus::*;
        match self {
            Pending => &[InReview, Rejected],
            InReview => &[Approved, Rejected],
            Approved | Rejected | Unknown => &[],
        }
    }

    fn requires_observation(self) -> bool {
        self == ApplicationStatus::Rejected
    }

    fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pendiente",
            ApplicationStatus::InReview => "En revisión",
            ApplicationStatus::Approved => "Aprobado",
            ApplicationStatus::Rejected => "Rechazado",
            ApplicationStatus::Unknown => "Desconocido",
        }
    }
}

impl Workflow for ReportStatus {
    fn allowed_next(self) -> &'static [Self] {
        match self {
            ReportStatus::Open | ReportStatus::Unknown => &[ReportStatus::Closed],
            ReportStatus::Closed => &[],
        }
    }

    fn label(self) -> &'static str {
        match self {
            ReportStatus::Open => "Abierto",
            ReportStatus::Closed => "Cerrado",
            ReportStatus::Unknown => "Desconocido",
        }
    }
}

impl Workflow for SponsorshipStatus {
    fn allowed_next(self) -> &'static [Self] {
        use SponsorshipStatus::*;
        match self {
            Pending | Unknown => &[Active, Inactive],
            Active => &[Inactive],
            Inactive => &[Active],
        }
    }

    fn label(self) -> &'static str {
        match self {
            SponsorshipStatus::Active => "Activo",
            SponsorshipStatus::Inactive => "Inactivo",
            SponsorshipStatus::Pending => "Pendiente",
            SponsorshipStatus::Unknown => "Desconocido",
        }
    }
}

impl Workflow for AnimalState {
    fn allowed_next(self) -> &'static [Self] {
        use AnimalState::*;
        match self {
            Deceased => &[],
            Available => &[UnderAdoption, UnderTreatment, Adopted, Sponsored, FosterHome, Deceased],
            UnderAdoption => &[Available, UnderTreatment, Adopted, Sponsored, FosterHome, Deceased],
            UnderTreatment => &[Available, UnderAdoption, Adopted, Sponsored, FosterHome, Deceased],
            Adopted => &[Available, UnderAdoption, UnderTreatment, Sponsored, FosterHome, Deceased],
            Sponsored => &[Available, UnderAdoption, UnderTreatment, Adopted, FosterHome, Deceased],
            FosterHome => &[Available, UnderAdoption, UnderTreatment, Adopted, Sponsored, Deceased],
            Unknown => &AnimalState::ALL,
        }
    }

    fn label(self) -> &'static str {
        match self {
            AnimalState::Available => "Disponible",
            AnimalState::UnderAdoption => "En Adopcion",
            AnimalState::UnderTreatment => "En tratamiento",
            AnimalState::Adopted => "Adoptado",
            AnimalState::Sponsored => "Apadrinado",
            AnimalState::FosterHome => "Refugio Temporal",
            AnimalState::Deceased => "Fallecido",
            AnimalState::Unknown => "Desconocido",
        }
    }
}

/// Which workflow a `workflow.transitions` request refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    Application,
    Report,
    Sponsorship,
    Animal,
}

/// One selectable option for the UI
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TransitionOption {
    pub status: String,
    pub label: &'static str,
    pub requires_observation: bool,
    /// No further change is possible once applied
    pub terminal: bool,
}

/// Allowed next states for a status given as its wire string
pub fn options_for(kind: WorkflowKind, current: &str) -> Result<Vec<TransitionOption>, ApiError> {
    fn collect<S: Workflow>(current: S) -> Vec<TransitionOption> {
        current
            .allowed_next()
            .iter()
            .map(|next| TransitionOption {
                status: next.to_string(),
                label: next.label(),
                requires_observation: next.requires_observation(),
                terminal: next.is_terminal(),
            })
            .collect()
    }

    let invalid = |e: String| ApiError::Validation(e);
    Ok(match kind {
        WorkflowKind::Application => collect(current.parse::<ApplicationStatus>().map_err(invalid)?),
        WorkflowKind::Report => collect(current.parse::<ReportStatus>().map_err(invalid)?),
        WorkflowKind::Sponsorship => collect(current.parse::<SponsorshipStatus>().map_err(invalid)?),
        WorkflowKind::Animal => {
            let state: AnimalState = match current.parse() {
                Ok(state) => state,
                Err(never) => match never {},
            };
            collect(state)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn application_review_path() {
        use ApplicationStatus::*;
        assert!(check_transition(Pending, InReview, None).is_ok());
        assert!(check_transition(InReview, Approved, None).is_ok());
        assert!(check_transition(InReview, Rejected, Some("No cumple requisitos")).is_ok());

        let err = check_transition(Pending, Approved, None).unwrap_err();
        assert!(matches!(err, ApiError::InvalidTransition { .. }));
        assert_eq!(err.to_string(), "Invalid status transition from PENDING to APPROVED");
    }

    #[test]
    fn final_decisions_are_terminal() {
        use ApplicationStatus::*;
        assert!(Approved.is_terminal());
        assert!(Rejected.is_terminal());
        assert!(check_transition(Approved, Pending, None).is_err());
        assert!(check_transition(Rejected, InReview, None).is_err());
    }

    #[test]
    fn rejection_needs_reason() {
        use ApplicationStatus::*;
        let err = check_transition(InReview, Rejected, Some("   ")).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(check_transition(Pending, Rejected, None).is_err());
    }

    #[test]
    fn same_status_is_a_no_op() {
        assert!(check_transition(ApplicationStatus::InReview, ApplicationStatus::InReview, None).is_ok());
        assert!(check_transition(ApplicationStatus::Rejected, ApplicationStatus::Rejected, None).is_ok());
        assert!(check_transition(ReportStatus::Closed, ReportStatus::Closed, None).is_ok());
    }

    #[test]
    fn reports_only_close() {
        assert!(check_transition(ReportStatus::Open, ReportStatus::Closed, None).is_ok());
        assert!(check_transition(ReportStatus::Closed, ReportStatus::Open, None).is_err());
    }

    #[test]
    fn sponsorship_can_be_reactivated() {
        use SponsorshipStatus::*;
        assert!(check_transition(Inactive, Active, None).is_ok());
        assert!(check_transition(Active, Inactive, None).is_ok());
        assert!(check_transition(Active, Pending, None).is_err());
    }

    #[test]
    fn deceased_animals_stay_deceased() {
        use AnimalState::*;
        assert!(check_transition(Adopted, Available, None).is_ok());
        assert!(check_transition(UnderTreatment, Deceased, None).is_ok());
        assert!(check_transition(Deceased, Available, None).is_err());
        for state in AnimalState::ALL {
            assert!(!state.allowed_next().contains(&state));
        }
    }

    #[test]
    fn unknown_status_is_never_a_target() {
        assert!(check_transition(ApplicationStatus::Unknown, ApplicationStatus::Unknown, None).is_err());
        assert!(check_transition(ApplicationStatus::Unknown, ApplicationStatus::InReview, None).is_err());
        assert!(check_transition(ReportStatus::Unknown, ReportStatus::Closed, None).is_ok());
        assert!(check_transition(AnimalState::Unknown, AnimalState::Available, None).is_ok());
        assert!(check_transition(AnimalState::Available, AnimalState::Unknown, None).is_err());
    }

    #[test]
    fn options_for_ui() {
        let options = options_for(WorkflowKind::Application, "IN_REVIEW").unwrap();
        let statuses: Vec<_> = options.iter().map(|o| o.status.as_str()).collect();
        assert_eq!(statuses, ["APPROVED", "REJECTED"]);
        assert!(options[1].requires_observation);
        assert_eq!(options[0].label, "Aprobado");
        assert!(options.iter().all(|o| o.terminal));

        assert!(options_for(WorkflowKind::Report, "CLOSED").unwrap().is_empty());
        assert!(options_for(WorkflowKind::Report, "ARCHIVED").is_err());
        assert_eq!(options_for(WorkflowKind::Animal, "DECEASED").unwrap().len(), 0);
    }
}
