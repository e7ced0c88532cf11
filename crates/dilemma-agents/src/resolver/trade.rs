//! TRADE: an atomic two-party token swap.

use dilemma_types::{AgentId, TradeDetails, TradeReason};

use super::ConflictResolver;
use crate::error::AgentError;
use crate::population::Population;

impl ConflictResolver<'_> {
    /// `actor` gives `offer` tokens to `partner` and receives `request`
    /// back. Either both transfers happen or neither does.
    ///
    /// Draws: none.
    pub fn resolve_trade(
        &self,
        actor: AgentId,
        partner: AgentId,
        offer: i64,
        request: i64,
        population: &mut Population,
    ) -> Result<TradeDetails, AgentError> {
        let refused = |reason| TradeDetails {
            success: false,
            reason,
            actor_gave: 0,
            actor_received: 0,
        };

        if population.balance(actor)? < offer {
            return Ok(refused(TradeReason::ActorInsufficientBalance));
        }
        if population.balance(partner)? < request {
            return Ok(refused(TradeReason::PartnerInsufficientBalance));
        }

        population.transfer(actor, partner, offer)?;
        population.transfer(partner, actor, request)?;
        Ok(TradeDetails {
            success: true,
            reason: TradeReason::TradeCompleted,
            actor_gave: offer,
            actor_received: request,
        })
    }
}
