use crate::{Def, Reflect, ScalarType, Shape, ShapeBuilder};

macro_rules! impl_reflect_scalar {
    ($($ty:ty => $scalar:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                const SHAPE: &'static Shape = &const {
                    ShapeBuilder::<$ty>::new(ScalarType::$scalar.name())
                        .def(Def::Scalar(ScalarType::$scalar))
                        .with_default()
                        .build()
                };
            }
        )*
    };
}

impl_reflect_scalar!(
    bool => Bool,
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => ISize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => USize,
    f32 => F32,
    f64 => F64,
    char => Char,
    String => String,
);
