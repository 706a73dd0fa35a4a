use instruct::{DefaultDecodeContext, Record};

use crate::common::{builder, constant, request, setup};

#[derive(Debug, Default, PartialEq, Record)]
struct Depths {
    #[instruct("const,v=5")]
    pub one: Option<u32>,
    #[instruct("const,v=6")]
    pub two: Option<Option<u32>>,
    #[instruct("const,v=hi")]
    pub boxed: Option<Box<Option<String>>>,
    #[instruct("const")]
    pub null_one: Option<u32>,
    #[instruct("const")]
    pub null_two: Option<Option<u32>>,
    #[instruct("const")]
    pub null_box: Box<Option<String>>,
}

#[test]
fn option_levels_wrap_and_null_clears() {
    setup();
    let decoder = builder::<DefaultDecodeContext>()
        .operation_fn("const", constant)
        .build();

    let mut value = Depths {
        null_one: Some(1),
        null_two: Some(Some(2)),
        null_box: Box::new(Some("stale".into())),
        ..Depths::default()
    };
    decoder
        .decode(&request("/", &[], ""), &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(
        value,
        Depths {
            one: Some(5),
            two: Some(Some(6)),
            boxed: Some(Box::new(Some("hi".into()))),
            null_one: None,
            null_two: None,
            null_box: Box::new(None),
        }
    );
}

#[derive(Debug, Default, PartialEq, Record)]
struct Filter {
    #[instruct("query")]
    pub tag: String,
    #[instruct("query,required=false")]
    pub limit: Option<u16>,
}

#[derive(Debug, Default, PartialEq, Record)]
struct Search {
    #[instruct("recurse")]
    pub filter: Option<Box<Filter>>,
    #[instruct("recurse")]
    pub fallback: Option<Filter>,
}

#[test]
fn recurse_allocates_absent_records() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();

    let mut value = Search::default();
    decoder
        .decode(
            &request("/?tag=rust", &[], ""),
            &mut value,
            &mut DefaultDecodeContext::default(),
        )
        .unwrap();
    let expected = Filter {
        tag: "rust".into(),
        limit: None,
    };
    assert_eq!(value.filter.as_deref(), Some(&expected));
    assert_eq!(value.fallback, Some(expected));
}

#[test]
fn optional_destination_root() {
    setup();
    let decoder = builder::<DefaultDecodeContext>().build();

    let mut value: Option<Box<Filter>> = None;
    decoder
        .decode(
            &request("/?tag=a&limit=3", &[], ""),
            &mut value,
            &mut DefaultDecodeContext::default(),
        )
        .unwrap();
    assert_eq!(
        value.as_deref(),
        Some(&Filter {
            tag: "a".into(),
            limit: Some(3),
        })
    );
}
