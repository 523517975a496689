//! Creature decision making and movement
//!
//! Each turn a creature first plans (perception, triggers, goal) and then
//! moves (step choice and execution). Multi-turn work is carried in the
//! creature's pending action.

pub mod deferred;
pub mod execute;
pub mod plan;
pub mod scent;
pub mod step;
pub mod turn;

pub use deferred::resume_deferred;
pub use execute::{
    attack_at, bash_at, dig_at, knock_back_from, melee_hit, move_to, open_door_at, push_to,
    stumble,
};
pub use plan::{plan, rate_target};
pub use scent::ScentMap;
pub use step::{
    Candidate, StepKind, assess_step, bash_estimate, calc_movecost, can_move_to, group_bash_skill,
    pick_step, scent_candidates, wander_next,
};
pub use turn::{move_creature, take_turn};
