//! Agent state machine and the player's locomotion states.

use bevy::log::debug;

/// What a state wants after its update.
pub enum Transition<A> {
    Stay,
    To(Box<dyn AgentState<A>>),
}

/// One behavior of an agent. Hooks receive the agent they drive.
pub trait AgentState<A>: Send + Sync {
    fn name(&self) -> &'static str;

    fn enter(&mut self, _agent: &mut A) {}

    fn handle_input(&mut self, _agent: &mut A) {}

    fn update(&mut self, agent: &mut A) -> Transition<A>;

    fn exit(&mut self, _agent: &mut A) {}
}

/// Runs exactly one state at a time for an agent.
pub struct AgentStateMachine<A> {
    current: Box<dyn AgentState<A>>,
}

impl<A> AgentStateMachine<A> {
    /// Start in `initial`, entering it right away.
    pub fn new(mut initial: Box<dyn AgentState<A>>, agent: &mut A) -> Self {
        initial.enter(agent);
        Self { current: initial }
    }

    pub fn current_name(&self) -> &'static str {
        self.current.name()
    }

    /// Let the state read input, then update it and apply any transition.
    pub fn tick(&mut self, agent: &mut A) {
        self.current.handle_input(agent);
        if let Transition::To(next) = self.current.update(agent) {
            self.transition_to(next, agent);
        }
    }

    /// Exit the current state, then enter `next`.
    pub fn transition_to(&mut self, mut next: Box<dyn AgentState<A>>, agent: &mut A) {
        debug!("Agent state {} -> {}", self.current.name(), next.name());
        self.current.exit(agent);
        next.enter(agent);
        self.current = next;
    }
}

/// Anything the locomotion states can drive.
pub trait Locomotion {
    fn handle_movement(&mut self);

    fn handle_weapon(&mut self);

    fn handle_animation(&mut self);

    fn is_walking(&self) -> bool;

    fn is_attacking(&self) -> bool;
}

/// Standing still. Moving switches to [`WalkingState`].
pub struct IdleState;

impl<A: Locomotion> AgentState<A> for IdleState {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn enter(&mut self, agent: &mut A) {
        agent.handle_animation();
    }

    fn handle_input(&mut self, agent: &mut A) {
        agent.handle_movement();
        agent.handle_weapon();
    }

    fn update(&mut self, agent: &mut A) -> Transition<A> {
        if agent.is_walking() {
            Transition::To(Box::new(WalkingState))
        } else {
            Transition::Stay
        }
    }
}

/// Moving. Stopping switches back to [`IdleState`].
pub struct WalkingState;

impl<A: Locomotion> AgentState<A> for WalkingState {
    fn name(&self) -> &'static str {
        "Walking"
    }

    fn enter(&mut self, agent: &mut A) {
        agent.handle_animation();
    }

    fn handle_input(&mut self, agent: &mut A) {
        agent.handle_movement();
        agent.handle_weapon();
    }

    fn update(&mut self, agent: &mut A) -> Transition<A> {
        if agent.is_walking() {
            Transition::Stay
        } else {
            Transition::To(Box::new(IdleState))
        }
    }
}

/// Planted in place and firing. Ends when the attack is released.
pub struct AttackingState;

impl<A: Locomotion> AgentState<A> for AttackingState {
    fn name(&self) -> &'static str {
        "Attacking"
    }

    fn handle_input(&mut self, agent: &mut A) {
        agent.handle_weapon();
    }

    fn update(&mut self, agent: &mut A) -> Transition<A> {
        if agent.is_attacking() {
            Transition::Stay
        } else {
            Transition::To(Box::new(IdleState))
        }
    }

    fn exit(&mut self, agent: &mut A) {
        agent.handle_animation();
    }
}
