//! # Inventory
//!
//! Which methods carry hard-coded date formats, for the host and each known companion. This is
//! data: a host update that moves a format only needs a new inventory.

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::companion::{CompanionIntegration, CompanionSpec, RefreshAction};
use crate::hook::TargetDescriptor;

/// Patch targets for one host version
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    /// Targets that must exist; patched in this order
    pub mandatory: Vec<TargetDescriptor>,
    /// Optional companions
    pub companions: Vec<CompanionSpec>,
}
impl Inventory {
    /// The built-in inventory
    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    /// Companions as independently failable integrations
    pub fn integrations(&self) -> Vec<Box<dyn CompanionIntegration>> {
        self.companions
            .iter()
            .cloned()
            .map(|c| Box::new(c) as Box<dyn CompanionIntegration>)
            .collect()
    }
}

/// Refresh by calling `method` on the live object of `type_name`
fn on_instance(type_name: &str, method: &str) -> RefreshAction {
    RefreshAction::InvokeOnInstance {
        type_name: type_name.into(),
        method: method.into(),
    }
}

lazy_static! {
    /// Targets for the current host release and the companions known to format dates themselves
    static ref BUILTIN: Inventory = Inventory {
        mandatory: vec![
            // main game date
            TargetDescriptor::public("UIDateTimeWrapper", "Check"),
            TargetDescriptor::non_public("ChirpXPanel", "UpdateBindings"),
            TargetDescriptor::non_public("FestivalPanel", "RefreshCurrentConcert"),
            TargetDescriptor::non_public("FestivalPanel", "RefreshFutureConcert"),
            TargetDescriptor::non_public("FootballPanel", "RefreshMatchInfo"),
            TargetDescriptor::non_public("VarsitySportsArenaPanel", "RefreshPastMatches"),
            TargetDescriptor::non_public("VarsitySportsArenaPanel", "RefreshNextMatchDates"),
        ],
        companions: vec![
            // original and 21:9 releases share one namespace and assembly name
            CompanionSpec {
                name: "Extended InfoPanel".into(),
                module_ids: vec![781767563, 2274354659],
                targets: vec![TargetDescriptor::public(
                    "[ExtendedInfoPanel]IINS.ExtendedInfo.CityInfoDatas",
                    "UpdateDate_1",
                )],
                refresh: vec![on_instance(
                    "[ExtendedInfoPanel]IINS.ExtendedInfo.CityInfoDatas",
                    "UpdateDate_1",
                )],
            },
            CompanionSpec {
                name: "Extended InfoPanel 2".into(),
                module_ids: vec![2498761388],
                targets: vec![TargetDescriptor::public(
                    "[ExtendedInfoPanel2]IINS.ExtendedInfo.CityInfoDatas",
                    "UpdateDate_1",
                )],
                refresh: vec![on_instance(
                    "[ExtendedInfoPanel2]IINS.ExtendedInfo.CityInfoDatas",
                    "UpdateDate_1",
                )],
            },
            CompanionSpec {
                name: "Enhanced Outside Connections View".into(),
                module_ids: vec![2368396560],
                targets: vec![TargetDescriptor::non_public(
                    "EnhancedOutsideConnectionsView.EOCVGraph",
                    "OnTooltipHover",
                )],
                refresh: Vec::new(),
            },
            CompanionSpec {
                name: "More City Statistics".into(),
                module_ids: vec![2685974449],
                targets: vec![
                    TargetDescriptor::non_public("MoreCityStatistics.UIImprovedGraph", "OnTooltipHover"),
                    TargetDescriptor::non_public("MoreCityStatistics.ShowRange", "UpdateSliderLabel"),
                ],
                refresh: vec![RefreshAction::InvokeOnSingleton {
                    type_name: "MoreCityStatistics.ShowRange".into(),
                    property: "instance".into(),
                    method: "UpdateSliderLabels".into(),
                }],
            },
        ],
    };
}
