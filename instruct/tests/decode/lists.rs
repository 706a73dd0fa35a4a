use instruct::{DefaultDecodeContext, Record};

use crate::common::{builder, constant, request, setup};

#[derive(Debug, Default, PartialEq, Record)]
struct Tags {
    #[instruct("query,name=id,required=false")]
    pub ids: Vec<u32>,
    #[instruct("header,name=x-tag,required=false")]
    pub tags: Option<Vec<String>>,
    #[instruct("const")]
    pub empty: Vec<u8>,
}

fn decode(uri: &str, headers: &[(&str, &str)]) -> Result<Tags, instruct::DecodeError> {
    let decoder = builder::<DefaultDecodeContext>()
        .operation_fn("const", constant)
        .build();
    let mut value = Tags {
        empty: vec![9],
        ..Tags::default()
    };
    decoder.decode(
        &request(uri, headers, ""),
        &mut value,
        &mut DefaultDecodeContext::default(),
    )?;
    Ok(value)
}

#[test]
fn every_occurrence_is_collected() {
    setup();
    let value = decode("/?id=3&id=1&id=2", &[("x-tag", "a"), ("x-tag", "b")]).unwrap();
    assert_eq!(value.ids, vec![3, 1, 2]);
    assert_eq!(value.tags, Some(vec!["a".to_owned(), "b".to_owned()]));
    // null replaces the list with an empty one
    assert_eq!(value.empty, Vec::<u8>::new());
}

#[test]
fn absent_lists_stay_untouched() {
    setup();
    let value = decode("/", &[]).unwrap();
    assert!(value.ids.is_empty());
    assert_eq!(value.tags, None);
}

#[test]
fn one_bad_item_fails_the_list() {
    setup();
    let err = decode("/?id=1&id=x", &[]).unwrap_err();
    insta::assert_snapshot!(err, @r#"error resolving field 'ids': invalid value "x" for type u32"#);
}
