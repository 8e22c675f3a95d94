use lupine_protocol::PlayerId;

use super::{Capability, RoleAction, RoleContext, RoleKind, RoleOutcome, RoleView, unsupported};
use crate::{GameError, Notice, PhaseKind, Player};

/// Plain villager. No ability; votes and talks like everyone else.
#[derive(Debug, Clone, Copy, Default)]
pub struct Villager;

impl Capability for Villager {
    fn kind(&self) -> RoleKind {
        RoleKind::Villager
    }

    fn can_act(&self, _owner: &Player, _phase: PhaseKind) -> bool {
        false
    }

    fn is_valid_target(
        &self,
        _view: &RoleView<'_>,
        _target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<(), GameError> {
        Err(unsupported(RoleKind::Villager, action))
    }

    fn act(
        &mut self,
        _ctx: &mut RoleContext<'_>,
        _target: Option<PlayerId>,
        action: RoleAction,
    ) -> Result<RoleOutcome, GameError> {
        Err(unsupported(RoleKind::Villager, action))
    }

    fn prompt(&self, _view: &RoleView<'_>, _secs: u64) -> Notice {
        Notice::Wait {
            role: RoleKind::Villager,
        }
    }
}
