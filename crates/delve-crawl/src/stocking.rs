//! Stocking a freshly entered area.
//!
//! Three rolls decide an area: its shape (flavor only), its contents, and
//! whether unguarded treasure is hidden there.

use crate::context::CrawlContext;
use crate::encounter;
use crate::journal::LogKind;
use crate::obstacle::{FeatureKind, HazardKind, Obstacle, ObstacleKind, TrapKind};
use crate::state::{AreaType, IntersectionKind, RoomContents, Status};

/// Area shape on 1d6, with the intersection kind on 1d4 when needed.
pub fn roll_shape(roll: u32, kind_roll: Option<u32>) -> (AreaType, Option<IntersectionKind>) {
    match roll {
        1..=3 => (AreaType::Room, None),
        4..=5 => (AreaType::Corridor, None),
        _ => {
            let kind = match kind_roll.unwrap_or(1) {
                1 => IntersectionKind::TJunction,
                2 => IntersectionKind::FourWay,
                3 => IntersectionKind::YFork,
                _ => IntersectionKind::Landing,
            };
            (AreaType::Intersection, Some(kind))
        }
    }
}

/// Contents on 1d6.
pub fn roll_contents(roll: u32) -> RoomContents {
    match roll {
        1..=2 => RoomContents::Empty,
        3 => RoomContents::Trap,
        4..=5 => RoomContents::Monster,
        _ => RoomContents::Special,
    }
}

/// Whether a 1d6 treasure roll finds treasure for the contents.
pub fn has_treasure(contents: RoomContents, roll: u32) -> bool {
    match contents {
        RoomContents::Empty => roll <= 1,
        RoomContents::Trap => roll <= 2,
        RoomContents::Monster => roll <= 3,
        RoomContents::Special => false,
    }
}

/// Special obstacle on 1d6; hazards need a 1d4 roll.
pub fn roll_special(roll: u32, hazard_roll: Option<u32>) -> ObstacleKind {
    match roll {
        1..=2 => ObstacleKind::StuckDoor,
        3 => ObstacleKind::LockedDoor,
        4 => ObstacleKind::SecretDoor { located: false },
        5 => ObstacleKind::Hazard(HazardKind::from_roll(hazard_roll.unwrap_or(1))),
        _ => ObstacleKind::Feature(FeatureKind::StrangeFountain),
    }
}

/// Enter and stock a new area.
pub fn stock_area(ctx: &mut CrawlContext<'_>) {
    let shape_roll = ctx.rng.roll_die(6);
    let kind_roll = (shape_roll == 6).then(|| ctx.rng.roll_die(4));
    let (area_type, intersection_kind) = roll_shape(shape_roll, kind_roll);
    ctx.state.enter_area(area_type, intersection_kind);

    let contents = roll_contents(ctx.rng.roll_die(6));
    let treasure_roll = ctx.rng.roll_die(6);
    ctx.state.room_contents = contents;
    ctx.state.room_has_treasure = has_treasure(contents, treasure_roll);

    let place = match intersection_kind {
        Some(kind) => kind.to_string(),
        None => area_type.to_string(),
    };
    ctx.log(LogKind::Explore, format!("The party enters a {place}."));

    match contents {
        RoomContents::Empty => {
            ctx.log(LogKind::Explore, "It appears to be empty.");
        }
        RoomContents::Trap => {
            let trap = TrapKind::from_roll(ctx.rng.roll_die(6));
            set_obstacle(ctx, ObstacleKind::Trap(trap));
            ctx.log(LogKind::Obstacle, format!("A {trap} guards the way."));
        }
        RoomContents::Monster => {
            encounter::start_encounter(ctx, false);
        }
        RoomContents::Special => {
            let roll = ctx.rng.roll_die(6);
            let hazard_roll = (roll == 5).then(|| ctx.rng.roll_die(4));
            let kind = roll_special(roll, hazard_roll);
            set_obstacle(ctx, kind);
            let message = match kind {
                ObstacleKind::SecretDoor { .. } => {
                    "The passage ends in blank stone. There may be a secret door.".to_string()
                }
                other => format!("A {other} lies ahead."),
            };
            ctx.log(LogKind::Obstacle, message);
        }
    }
}

fn set_obstacle(ctx: &mut CrawlContext<'_>, kind: ObstacleKind) {
    ctx.state.obstacle = Some(Obstacle::new(kind));
    ctx.state.status = Status::Obstacle;
}
