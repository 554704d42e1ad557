//! Logical CVDW resources and their paging defaults.

use std::fmt;

/// A logical resource synced from the CVDW API.
///
/// Sale and Reservation read the same endpoint (`reservas`) but land in
/// different tables with different filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Resource {
    Development,
    Unit,
    Sale,
    Commission,
    Prosoluto,
    Attendance,
    Payout,
    Reservation,
    Typology,
    SaleCondition,
}

impl Resource {
    /// Every resource, in sync order.
    pub const ALL: [Resource; 10] = [
        Resource::Development,
        Resource::Unit,
        Resource::Sale,
        Resource::Commission,
        Resource::Prosoluto,
        Resource::Attendance,
        Resource::Payout,
        Resource::Reservation,
        Resource::Typology,
        Resource::SaleCondition,
    ];

    /// Resources whose failure aborts the run.
    pub const REQUIRED: [Resource; 4] = [
        Resource::Development,
        Resource::Unit,
        Resource::Sale,
        Resource::Commission,
    ];

    /// Resources synced best-effort after the required phase.
    pub const SECONDARY: [Resource; 6] = [
        Resource::Prosoluto,
        Resource::Attendance,
        Resource::Payout,
        Resource::Reservation,
        Resource::Typology,
        Resource::SaleCondition,
    ];

    /// Path under the CVDW base URL.
    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Resource::Development => "empreendimentos",
            Resource::Unit => "unidades",
            Resource::Sale | Resource::Reservation => "reservas",
            Resource::Commission => "comissoes",
            Resource::Prosoluto => "prosoluto",
            Resource::Attendance => "atendimentos",
            Resource::Payout => "repasses",
            Resource::Typology => "tipologia_unidades",
            Resource::SaleCondition => "reservas/condicoes",
        }
    }

    /// Stable lowercase name used in logs, config keys and summaries.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Resource::Development => "developments",
            Resource::Unit => "units",
            Resource::Sale => "sales",
            Resource::Commission => "commissions",
            Resource::Prosoluto => "prosoluto",
            Resource::Attendance => "attendances",
            Resource::Payout => "payouts",
            Resource::Reservation => "reservations",
            Resource::Typology => "typologies",
            Resource::SaleCondition => "sale_conditions",
        }
    }

    /// Parse a resource from its [`name`](Self::name).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.name() == name)
    }

    /// Maximum records fetched per run before paging stops.
    #[must_use]
    pub fn default_cap(self) -> usize {
        match self {
            Resource::Sale => 2000,
            Resource::Unit | Resource::Commission | Resource::Prosoluto => 1000,
            Resource::Development
            | Resource::Attendance
            | Resource::Payout
            | Resource::Reservation
            | Resource::Typology
            | Resource::SaleCondition => 500,
        }
    }

    /// Whether the endpoint accepts the `a_partir_data_referencia` filter.
    #[must_use]
    pub fn supports_since(self) -> bool {
        !matches!(
            self,
            Resource::Development | Resource::Unit | Resource::Typology
        )
    }

    /// Whether a failure of this resource aborts the run.
    #[must_use]
    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
