use rand::Rng;
use std::fmt::Debug;

pub trait Shape: Debug {
    fn bounding_box(&self) -> Rectangle;
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.x += dx;
        self.y += dy;
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl Shape for Circle {
    fn bounding_box(&self) -> Rectangle {
        Rectangle::new(
            self.x - self.radius,
            self.y - self.radius,
            self.x + self.radius,
            self.y + self.radius,
        )
    }
}

/// Axis-aligned box stored by its edges. `top` is the minimum y.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Rectangle {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rectangle {
    pub fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn from_center(x: f32, y: f32, width: f32, height: f32) -> Self {
        let half_w = width * 0.5;
        let half_h = height * 0.5;
        Self::new(x - half_w, y - half_h, x + half_w, y + half_h)
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn center_x(&self) -> f32 {
        (self.left + self.right) * 0.5
    }

    pub fn center_y(&self) -> f32 {
        (self.top + self.bottom) * 0.5
    }

    pub fn is_finite(&self) -> bool {
        self.left.is_finite()
            && self.top.is_finite()
            && self.right.is_finite()
            && self.bottom.is_finite()
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    pub fn contains_rectangle(&self, other: &Rectangle) -> bool {
        self.left <= other.left
            && self.right >= other.right
            && self.top <= other.top
            && self.bottom >= other.bottom
    }

    pub fn expand_to_include(&mut self, other: &Rectangle) {
        self.left = f32::min(self.left, other.left);
        self.top = f32::min(self.top, other.top);
        self.right = f32::max(self.right, other.right);
        self.bottom = f32::max(self.bottom, other.bottom);
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.left += dx;
        self.right += dx;
        self.top += dy;
        self.bottom += dy;
    }

    /// Random box of the given size lying fully inside `self`. Boxes larger
    /// than `self` are pinned to the top-left corner.
    pub fn random_rectangle_inside<R: Rng>(
        &self,
        width: f32,
        height: f32,
        rng: &mut R,
    ) -> Rectangle {
        let left = safe_randf32(rng, self.left, self.right - width);
        let top = safe_randf32(rng, self.top, self.bottom - height);
        Rectangle::new(left, top, left + width, top + height)
    }

    pub fn random_circle_inside<R: Rng>(&self, radius: f32, rng: &mut R) -> Circle {
        Circle::new(
            safe_randf32(rng, self.left + radius, self.right - radius),
            safe_randf32(rng, self.top + radius, self.bottom - radius),
            radius,
        )
    }
}

fn safe_randf32<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if min >= max {
        return min;
    }
    rng.gen_range(min..max)
}

impl Default for Rectangle {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 0.0)
    }
}

impl Shape for Rectangle {
    fn bounding_box(&self) -> Rectangle {
        *self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeEnum {
    Circle(Circle),
    Rectangle(Rectangle),
}

impl ShapeEnum {
    pub fn translate(&mut self, dx: f32, dy: f32) {
        match self {
            ShapeEnum::Circle(circle) => circle.translate(dx, dy),
            ShapeEnum::Rectangle(rectangle) => rectangle.translate(dx, dy),
        }
    }
}

impl Shape for ShapeEnum {
    fn bounding_box(&self) -> Rectangle {
        match self {
            ShapeEnum::Circle(circle) => circle.bounding_box(),
            ShapeEnum::Rectangle(rectangle) => rectangle.bounding_box(),
        }
    }
}
