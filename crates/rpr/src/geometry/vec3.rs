use std::ops;

/// Position, direction or linear RGB triple.
#[repr(C)]
#[derive(Clone, Copy, Default, Debug, PartialEq)]
pub struct Vec3(pub f32, pub f32, pub f32);

impl Vec3 {
    pub const fn zero() -> Vec3 {
        Vec3(0.0, 0.0, 0.0)
    }

    pub fn square_magnitude(&self) -> f32 {
        Vec3::dot(*self, *self)
    }

    pub fn length(&self) -> f32 {
        self.square_magnitude().sqrt()
    }

    pub fn dot(a: Vec3, b: Vec3) -> f32 {
        a.0 * b.0 + a.1 * b.1 + a.2 * b.2
    }

    pub fn cross(u: Vec3, v: Vec3) -> Vec3 {
        Vec3(u.1 * v.2 - u.2 * v.1, u.2 * v.0 - u.0 * v.2, u.0 * v.1 - u.1 * v.0)
    }

    // zero stays zero
    pub fn normalized(u: Vec3) -> Vec3 {
        let length = u.length();
        if length == 0.0 { u } else { u / length }
    }

    pub fn near_zero(&self) -> bool {
        self.square_magnitude() < 1e-16
    }

    /// `t` is clamped to `[0, 1]`.
    pub fn lerp(a: Vec3, b: Vec3, t: f32) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        a * (1.0 - t) + b * t
    }
}

impl ops::Add for Vec3 {
    type Output = Vec3;
    fn add(self, rhs: Self) -> Self::Output {
        Vec3(self.0 + rhs.0, self.1 + rhs.1, self.2 + rhs.2)
    }
}

impl ops::AddAssign for Vec3 {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl ops::Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, rhs: Self) -> Self::Output {
        self + -rhs
    }
}

impl ops::Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

// component-wise, used to tint colors
impl ops::Mul for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: Self) -> Self::Output {
        Vec3(self.0 * rhs.0, self.1 * rhs.1, self.2 * rhs.2)
    }
}

impl ops::Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, rhs: f32) -> Self::Output {
        Vec3(self.0 * rhs, self.1 * rhs, self.2 * rhs)
    }
}

impl ops::Mul<Vec3> for f32 {
    type Output = Vec3;
    fn mul(self, rhs: Vec3) -> Self::Output {
        rhs * self
    }
}

impl ops::Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, rhs: f32) -> Self::Output {
        Vec3(self.0 / rhs, self.1 / rhs, self.2 / rhs)
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from(value: [f32; 3]) -> Self {
        Vec3(value[0], value[1], value[2])
    }
}

impl From<Vec3> for [f32; 3] {
    fn from(value: Vec3) -> Self {
        [value.0, value.1, value.2]
    }
}
