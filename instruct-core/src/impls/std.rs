use core::time::Duration;

use crate::{Reflect, Shape, ShapeBuilder, StructOption};

impl Reflect for Duration {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<Duration>::new("Duration")
            .with_default()
            .build()
    };
}

impl Reflect for StructOption {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<StructOption>::new("StructOption")
            .with_default()
            .build()
    };
}
