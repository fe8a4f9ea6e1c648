use nalgebra::Vector2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BallStatus {
    InPlay,
    Shot,
    Cross,
    Loose,
    Dead,
}

#[derive(Debug, Clone)]
pub struct BallState {
    pub position: Vector2<f32>,
    pub velocity: Vector2<f32>,
    pub status: BallStatus,
}

impl BallState {
    pub fn at_kickoff() -> Self {
        BallState {
            position: Vector2::new(50.0, 50.0),
            velocity: Vector2::zeros(),
            status: BallStatus::Dead,
        }
    }

    pub fn speed(&self) -> f32 {
        self.velocity.norm()
    }

    pub fn direction(&self) -> Vector2<f32> {
        if self.speed() < f32::EPSILON {
            Vector2::zeros()
        } else {
            self.velocity.normalize()
        }
    }

    /// Clamps position into [0,100]^2, matching spec §3's tick-boundary
    /// invariant. In-flight interpolation (not exposed here) may briefly
    /// exceed this by ±1 but never at a tick boundary.
    pub fn clamp_to_pitch(&mut self) {
        self.position.x = self.position.x.clamp(0.0, 100.0);
        self.position.y = self.position.y.clamp(0.0, 100.0);
    }

    pub fn reset_to_kickoff(&mut self) {
        self.position = Vector2::new(50.0, 50.0);
        self.velocity = Vector2::zeros();
        self.status = BallStatus::Dead;
    }
}
