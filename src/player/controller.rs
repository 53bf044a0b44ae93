//! Player movement and shooting, driven by the locomotion states.

use bevy::math::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::states::{AgentStateMachine, AttackingState, IdleState, Locomotion};
use crate::combat::{PlayerWeapon, ShotRequest, WeaponTuning};
use crate::core::EventBus;
use crate::enemies::{Pose, FORWARD};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub move_speed: f32,
    pub turn_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            move_speed: 5.0,
            turn_speed: 10.0,
        }
    }
}

/// Input for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayerInput {
    /// Stick or WASD direction. `y` points away from the camera.
    pub movement: Vec2,
    /// Point on the ground to shoot at, when the trigger was pulled this frame.
    pub fire_at: Option<Vec3>,
}

pub struct PlayerAgent {
    pub pose: Pose,
    pub tuning: PlayerTuning,
    pub weapon: PlayerWeapon,
    walking: bool,
    attacking: bool,
    /// Walking flag as last shown by the animation
    animated_walking: bool,
    input: PlayerInput,
    now: f32,
    dt: f32,
    shots: Vec<ShotRequest>,
}

impl PlayerAgent {
    pub fn new(position: Vec3, tuning: PlayerTuning, weapon: PlayerWeapon) -> Self {
        Self {
            pose: Pose::at(position),
            tuning,
            weapon,
            walking: false,
            attacking: false,
            animated_walking: false,
            input: PlayerInput::default(),
            now: 0.0,
            dt: 0.0,
            shots: Vec::new(),
        }
    }

    pub fn animated_walking(&self) -> bool {
        self.animated_walking
    }
}

impl Locomotion for PlayerAgent {
    fn handle_movement(&mut self) {
        let input = self.input.movement.normalize_or_zero();
        let direction = Vec3::new(input.x, 0.0, -input.y);

        if direction != Vec3::ZERO {
            self.pose.position += direction * self.tuning.move_speed * self.dt;
            let facing = Quat::from_rotation_arc(FORWARD, direction);
            self.pose.rotation = self
                .pose
                .rotation
                .slerp(facing, (self.tuning.turn_speed * self.dt).clamp(0.0, 1.0));
        }
        self.walking = direction != Vec3::ZERO;
    }

    fn handle_weapon(&mut self) {
        let Some(target) = self.input.fire_at else {
            return;
        };

        let mut direction = target - self.pose.position;
        direction.y = 0.0;
        if let Some(shot) = self.weapon.try_shoot(self.pose.position, direction, self.now) {
            self.shots.push(shot);
        }
    }

    fn handle_animation(&mut self) {
        self.animated_walking = self.walking;
    }

    fn is_walking(&self) -> bool {
        self.walking
    }

    fn is_attacking(&self) -> bool {
        self.attacking
    }
}

pub struct PlayerController {
    pub agent: PlayerAgent,
    machine: AgentStateMachine<PlayerAgent>,
}

impl PlayerController {
    pub fn new(position: Vec3, tuning: PlayerTuning, weapon: WeaponTuning, bus: EventBus) -> Self {
        let mut agent = PlayerAgent::new(position, tuning, PlayerWeapon::new(weapon, bus));
        let machine = AgentStateMachine::new(Box::new(IdleState), &mut agent);
        Self { agent, machine }
    }

    pub fn state_name(&self) -> &'static str {
        self.machine.current_name()
    }

    pub fn pose(&self) -> Pose {
        self.agent.pose
    }

    pub fn weapon_mut(&mut self) -> &mut PlayerWeapon {
        &mut self.agent.weapon
    }

    /// Run one frame and return the bullets fired during it.
    pub fn tick(&mut self, input: PlayerInput, now: f32, dt: f32) -> Vec<ShotRequest> {
        self.agent.input = input;
        self.agent.now = now;
        self.agent.dt = dt;
        self.machine.tick(&mut self.agent);
        std::mem::take(&mut self.agent.shots)
    }

    /// Plant the player and fire at will until [`end_attack`](Self::end_attack).
    pub fn begin_attack(&mut self) {
        if self.agent.attacking {
            return;
        }
        self.agent.attacking = true;
        self.machine
            .transition_to(Box::new(AttackingState), &mut self.agent);
    }

    pub fn end_attack(&mut self) {
        self.agent.attacking = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.1;

    fn controller() -> PlayerController {
        PlayerController::new(
            Vec3::ZERO,
            PlayerTuning::default(),
            WeaponTuning::default(),
            EventBus::new(),
        )
    }

    #[test]
    fn moving_walks_and_stopping_idles() {
        let mut player = controller();

        player.tick(
            PlayerInput {
                movement: Vec2::Y,
                ..Default::default()
            },
            0.0,
            DT,
        );
        assert_eq!(player.state_name(), "Walking");
        assert!(player.agent.animated_walking());
        assert!((player.pose().position - Vec3::new(0.0, 0.0, -0.5)).length() < 1e-5);

        player.tick(PlayerInput::default(), 0.1, DT);
        assert_eq!(player.state_name(), "Idle");
        assert!(!player.agent.animated_walking());
    }

    #[test]
    fn diagonal_input_is_normalized() {
        let mut player = controller();

        player.tick(
            PlayerInput {
                movement: Vec2::new(1.0, 1.0),
                ..Default::default()
            },
            0.0,
            DT,
        );

        assert!((player.pose().position.length() - 0.5).abs() < 1e-5);
    }

    #[test]
    fn fire_produces_shots_towards_target_on_the_ground_plane() {
        let mut player = controller();

        let shots = player.tick(
            PlayerInput {
                fire_at: Some(Vec3::new(0.0, 5.0, 4.0)),
                ..Default::default()
            },
            1.0,
            DT,
        );

        assert_eq!(shots.len(), 1);
        assert!((shots[0].velocity.normalize() - Vec3::Z).length() < 1e-5);

        let again = player.tick(
            PlayerInput {
                fire_at: Some(Vec3::X),
                ..Default::default()
            },
            1.1,
            DT,
        );
        assert!(again.is_empty(), "weapon is still cooling down");
    }

    #[test]
    fn attacking_stands_still_and_fires() {
        let mut player = controller();
        player.begin_attack();
        assert_eq!(player.state_name(), "Attacking");

        let shots = player.tick(
            PlayerInput {
                movement: Vec2::X,
                fire_at: Some(Vec3::X * 3.0),
            },
            2.0,
            DT,
        );
        assert_eq!(shots.len(), 1);
        assert_eq!(player.pose().position, Vec3::ZERO);

        player.end_attack();
        player.tick(PlayerInput::default(), 2.1, DT);
        assert_eq!(player.state_name(), "Idle");
    }
}
