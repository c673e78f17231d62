use crate::model::StaffDashboard;

/// Latest staff dashboard aggregates. Assigned orders live on the order board.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardState {
    pub dashboard: Option<StaffDashboard>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    pub const PATH: &'static str = "staff/dashboard";
}
