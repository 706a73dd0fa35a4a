use instruct::{DefaultDecodeContext, Record, StructOption, map_tags};
use serde::Deserialize;

use crate::common::{JsonBody, RecordingContext, builder, record, request, setup};

#[derive(Debug, Default, Record)]
struct Before {
    #[instruct("record,name=so,so_when=before,so_recurse=true")]
    so: StructOption,
    #[instruct("record,name=first")]
    pub first: u8,
    #[instruct("record,name=second")]
    pub second: u8,
}

#[derive(Debug, Default, Record)]
struct After {
    #[instruct("record,name=so,so_recurse=true")]
    so: StructOption,
    #[instruct("record,name=first")]
    pub first: u8,
}

#[derive(Debug, Default, Record)]
struct Alone {
    #[instruct("record,name=so")]
    so: StructOption,
    #[instruct("record,name=first")]
    pub first: u8,
}

fn run<T: Record>(map_tags: Option<&instruct::MapTags>) -> Vec<String> {
    let decoder = builder::<RecordingContext>()
        .operation_fn("record", record)
        .build();
    let mut ctx = RecordingContext::default();
    let mut value = T::default();
    let mut options = instruct::DecodeOptions::new(&mut ctx);
    if let Some(map_tags) = map_tags {
        options = options.map_tags(map_tags);
    }
    decoder
        .decode_with(&request("/", &[], ""), &mut value, options)
        .unwrap();
    ctx.log
}

#[test]
fn struct_option_phases() {
    setup();
    assert_eq!(run::<Before>(None), ["so", "first", "second"]);
    assert_eq!(run::<After>(None), ["first", "so"]);
    // without so_recurse the fields are left alone
    assert_eq!(run::<Alone>(None), ["so"]);
}

#[test]
fn map_tags_replace_the_struct_option() {
    setup();
    let map_tags = map_tags! { "_" => "record,name=other" };
    assert_eq!(run::<Before>(Some(&map_tags)), ["other"]);

    let map_tags = map_tags! { "_" => "record,name=other,so_recurse=true" };
    assert_eq!(run::<Alone>(Some(&map_tags)), ["first", "other"]);
}

#[derive(Debug, Default, Deserialize, Record)]
#[serde(default)]
struct CreateUser {
    #[instruct("body,so_when=before,so_recurse=true")]
    #[serde(skip)]
    so: StructOption,
    #[instruct("-")]
    pub name: String,
    #[instruct("-")]
    pub age: u8,
    #[instruct("header,name=x-request-id")]
    #[serde(skip)]
    pub request_id: String,
}

#[test]
fn body_then_fields() {
    setup();
    let decoder = builder::<DefaultDecodeContext>()
        .operation("body", JsonBody::<CreateUser>::new())
        .build();
    let request = request(
        "/users",
        &[("x-request-id", "r1")],
        r#"{"name":"ann","age":30,"request_id":"ignored"}"#,
    );

    let mut value = CreateUser::default();
    decoder
        .decode(&request, &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.name, "ann");
    assert_eq!(value.age, 30);
    assert_eq!(value.request_id, "r1");

    let err = decoder
        .decode(
            &crate::common::request("/users", &[("x-request-id", "r1")], ""),
            &mut CreateUser::default(),
            &mut DefaultDecodeContext::default(),
        )
        .unwrap_err();
    insta::assert_snapshot!(
        err,
        @"struct option 'CreateUser' (tag name 'so') with operation 'body' is required but was not set"
    );
}

#[derive(Debug, Default, Deserialize, Record)]
#[serde(default)]
struct Profile {
    #[instruct("body")]
    #[serde(skip)]
    so: StructOption,
    pub bio: String,
    pub site: Option<String>,
}

#[derive(Debug, Default, Record)]
struct UpdateProfile {
    #[instruct("header,name=x-user")]
    pub user: String,
    pub profile: Option<Profile>,
}

#[test]
fn field_takes_the_struct_option_of_its_type() {
    setup();
    let decoder = builder::<DefaultDecodeContext>()
        .operation("body", JsonBody::<Profile>::new())
        .build();

    let info = decoder.struct_info::<UpdateProfile>().unwrap();
    insta::assert_snapshot!(info, @r"
    - {ROOT} [/] (type: UpdateProfile)
      - user [/user] (type: String, field type: String) header(name=x-user, required)
      - profile [/profile] (type: Profile, field type: Option<Profile>) body(name=so, required) so(when=after, recurse=false)
    ");

    let request = request("/me", &[("x-user", "bob")], r#"{"bio":"hi"}"#);
    let mut value = UpdateProfile::default();
    decoder
        .decode(&request, &mut value, &mut DefaultDecodeContext::default())
        .unwrap();
    assert_eq!(value.user, "bob");
    let profile = value.profile.unwrap();
    assert_eq!(profile.bio, "hi");
    assert_eq!(profile.site, None);

    let request = crate::common::request("/me", &[("x-user", "bob")], "");
    let err = decoder
        .decode(&request, &mut UpdateProfile::default(), &mut DefaultDecodeContext::default())
        .unwrap_err();
    insta::assert_snapshot!(
        err,
        @"struct option 'profile' (tag name 'so') with operation 'body' is required but was not set"
    );
}

#[test]
fn struct_options_cannot_be_ignored() {
    #[derive(Debug, Default, Record)]
    struct Ignored {
        #[instruct("-")]
        so: StructOption,
        #[instruct("query")]
        pub id: u8,
    }

    setup();
    let decoder = builder::<DefaultDecodeContext>().build();
    let err = decoder.struct_info::<Ignored>().unwrap_err();
    insta::assert_snapshot!(err, @"cannot ignore struct option for field 'Ignored'");
}
