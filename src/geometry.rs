/// Widget allocation or render target, in toplevel surface coordinates.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rectangle {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rectangle {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_origin(&self) -> bool {
        self.x == 0 && self.y == 0
    }

    pub fn same_size(&self, other: &Rectangle) -> bool {
        self.width == other.width && self.height == other.height
    }
}

impl From<&gtk::Allocation> for Rectangle {
    fn from(allocation: &gtk::Allocation) -> Self {
        Rectangle::new(
            allocation.x(),
            allocation.y(),
            allocation.width(),
            allocation.height(),
        )
    }
}

impl From<&gdk::EventConfigure> for Rectangle {
    fn from(event: &gdk::EventConfigure) -> Self {
        let (x, y) = event.position();
        let (width, height) = event.size();
        Rectangle::new(x, y, width as i32, height as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_only_zero_zero() {
        assert!(Rectangle::new(0, 0, 320, 240).is_origin());
        assert!(!Rectangle::new(0, 12, 320, 240).is_origin());
        assert!(!Rectangle::new(5, 0, 0, 0).is_origin());
    }

    #[test]
    fn same_size_ignores_position() {
        let a = Rectangle::new(10, 10, 640, 480);
        assert!(a.same_size(&Rectangle::new(0, 0, 640, 480)));
        assert!(!a.same_size(&Rectangle::new(10, 10, 641, 480)));
    }
}
