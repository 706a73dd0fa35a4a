use core::any::{Any, type_name};

use crate::{
    BoxedValue, Def, ListDef, OptionDef, PointerDef, Reflect, ReflectError, Shape, ShapeBuilder,
    downcast_boxed,
};

impl<T: Reflect> Reflect for Option<T> {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<Option<T>>::new("Option")
            .def(Def::Option(OptionDef::new(
                T::SHAPE,
                option_wrap::<T>,
                option_none::<T>,
                option_get_or_init::<T>,
            )))
            .with_default()
            .build()
    };
}

fn option_wrap<T: 'static>(value: BoxedValue) -> Result<BoxedValue, ReflectError> {
    let value = downcast_boxed::<T>(value)?;
    Ok(Box::new(Some(value)))
}

fn option_none<T: 'static>() -> BoxedValue {
    Box::new(None::<T>)
}

fn option_get_or_init<T: Reflect>(value: &mut dyn Any) -> Option<&mut dyn Any> {
    let option = value.downcast_mut::<Option<T>>()?;
    if option.is_none() {
        let inner = downcast_boxed::<T>(T::SHAPE.default_value()?).ok()?;
        *option = Some(inner);
    }
    option.as_mut().map(|inner| inner as &mut dyn Any)
}

impl<T: Reflect> Reflect for Box<T> {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<Box<T>>::new("Box")
            .def(Def::Pointer(PointerDef::new(
                T::SHAPE,
                box_wrap::<T>,
                box_get_mut::<T>,
            )))
            .default_fn(box_default::<T>)
            .build()
    };
}

fn box_wrap<T: 'static>(value: BoxedValue) -> Result<BoxedValue, ReflectError> {
    let value = value.downcast::<T>().map_err(|_| ReflectError::WrongType {
        expected: type_name::<T>(),
    })?;
    Ok(Box::new(value))
}

fn box_get_mut<T: 'static>(value: &mut dyn Any) -> Option<&mut dyn Any> {
    value
        .downcast_mut::<Box<T>>()
        .map(|boxed| &mut **boxed as &mut dyn Any)
}

fn box_default<T: Reflect>() -> Option<BoxedValue> {
    let inner = downcast_boxed::<T>(T::SHAPE.default_value()?).ok()?;
    Some(Box::new(Box::new(inner)))
}

impl<T: Reflect> Reflect for Vec<T> {
    const SHAPE: &'static Shape = &const {
        ShapeBuilder::<Vec<T>>::new("Vec")
            .def(Def::List(ListDef::new(T::SHAPE, vec_from_items::<T>)))
            .with_default()
            .build()
    };
}

fn vec_from_items<T: 'static>(items: Vec<BoxedValue>) -> Result<BoxedValue, ReflectError> {
    let items = items
        .into_iter()
        .map(downcast_boxed::<T>)
        .collect::<Result<Vec<T>, _>>()?;
    Ok(Box::new(items))
}
