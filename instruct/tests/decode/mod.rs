mod lists;
mod options;
mod overrides;
mod required;
mod scalars;
mod struct_option;
mod type_decoder;
mod validate;
