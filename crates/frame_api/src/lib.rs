//! Core frame logic: the press-to-frame transition cycle and the props
//! builders for the two frame kinds the service serves.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use renderer::Renderer;
use shared::{
    domain::{Action, PlayerId, Position, Transition},
    error::FrameError,
};
use storage::Storage;
use tracing::{debug, info};

pub mod frame;
pub mod grid;

pub use frame::{frame_html, FrameProps, FRAME_VERSION};

/// Shared per-process context handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub renderer: Renderer,
    pub frames: FrameConfig,
}

/// Frame presentation knobs, sourced from server settings.
#[derive(Debug, Clone)]
pub struct FrameConfig {
    /// Externally reachable base URL; buttons only post back when set.
    pub public_url: Option<String>,
    pub demo_image_url: String,
    /// Board image edge length in pixels.
    pub frame_size: u32,
}

/// Result of one press cycle.
#[derive(Debug, Clone)]
pub struct FrameCycle {
    pub position: Position,
    /// `None` for the probe path, which renders without acting.
    pub outcome: Option<Transition>,
    pub image_data_url: String,
}

/// Re-read and re-step this many times when a concurrent press wins the
/// conditional write.
const CAS_ATTEMPTS: usize = 4;

/// One complete frame cycle: read (seeding new players at spawn), step,
/// persist, render. `action: None` runs the same cycle without mutating —
/// the diagnostic probe shares this path instead of duplicating it.
pub async fn advance(
    ctx: &ApiContext,
    player: PlayerId,
    action: Option<Action>,
) -> Result<FrameCycle, FrameError> {
    let (position, outcome) = match action {
        Some(action) => {
            let transition = persist_step(ctx, player, action).await?;
            (transition.position(), Some(transition))
        }
        None => (read_or_spawn(ctx, player).await?, None),
    };

    let scene = grid::scene(position, ctx.frames.frame_size);
    let png = ctx
        .renderer
        .render(&scene)
        .map_err(|error| FrameError::RenderFailure(error.to_string()))?;
    let image_data_url = format!("data:image/png;base64,{}", STANDARD.encode(png));

    info!(
        player = player.0,
        ?action,
        ?outcome,
        x = position.x,
        y = position.y,
        "frame cycle complete"
    );
    Ok(FrameCycle {
        position,
        outcome,
        image_data_url,
    })
}

/// The static demo frame: fixed remote image, two buttons, no post URL.
pub fn demo_frame(ctx: &ApiContext) -> FrameProps {
    FrameProps {
        version: FRAME_VERSION,
        image: ctx.frames.demo_image_url.clone(),
        buttons: vec!["start".to_string(), "about".to_string()],
        post_url: None,
    }
}

/// The game frame for a finished cycle: embedded board image and the four
/// directional buttons.
pub fn maze_frame(ctx: &ApiContext, cycle: &FrameCycle) -> FrameProps {
    FrameProps {
        version: FRAME_VERSION,
        image: cycle.image_data_url.clone(),
        buttons: Action::ALL
            .iter()
            .map(|action| action.label().to_string())
            .collect(),
        post_url: ctx
            .frames
            .public_url
            .as_ref()
            .map(|base| format!("{}/frame", base.trim_end_matches('/'))),
    }
}

async fn read_or_spawn(ctx: &ApiContext, player: PlayerId) -> Result<Position, FrameError> {
    match ctx
        .storage
        .position(player)
        .await
        .map_err(store_unavailable)?
    {
        Some(position) => Ok(position),
        None => ctx
            .storage
            .seed_position(player, grid::SPAWN)
            .await
            .map_err(store_unavailable),
    }
}

/// Read-step-write with a conditional update. Losing the write means
/// another press moved the row first; reload and re-step so the final state
/// is some serial order of the presses.
async fn persist_step(
    ctx: &ApiContext,
    player: PlayerId,
    action: Action,
) -> Result<Transition, FrameError> {
    for attempt in 0..CAS_ATTEMPTS {
        let current = read_or_spawn(ctx, player).await?;
        let transition = grid::step(current, action);
        let Transition::Moved(next) = transition else {
            return Ok(transition);
        };
        if ctx
            .storage
            .update_position_if(player, current, next)
            .await
            .map_err(store_unavailable)?
        {
            return Ok(transition);
        }
        debug!(
            player = player.0,
            attempt, "position changed underneath this press, retrying"
        );
    }
    Err(FrameError::StoreUnavailable(
        "conditional position update kept losing".to_string(),
    ))
}

fn store_unavailable(error: anyhow::Error) -> FrameError {
    FrameError::StoreUnavailable(error.to_string())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
