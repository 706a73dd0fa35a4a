use jiff::{SignedDuration, Timestamp};

use crate::{Reflect, Shape, ShapeBuilder};

impl Reflect for Timestamp {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<Timestamp>::new("Timestamp")
            .with_default()
            .with_parse()
            .build()
    };
}

impl Reflect for SignedDuration {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<SignedDuration>::new("SignedDuration")
            .with_default()
            .with_parse()
            .build()
    };
}
