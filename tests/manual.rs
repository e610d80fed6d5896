//! Records implemented by hand, without the derive macro.

use bytelayout::{
    ByteOrder, Decode, Error, FieldDescriptor, FieldKind, FieldTarget, Record, RecordLayout,
    Target, TypeDescriptor, Width, decode, hook,
};

static SEALED: RecordLayout = RecordLayout {
    name: "Sealed",
    fields: &[FieldDescriptor {
        name: "value",
        kind: FieldKind::Value(TypeDescriptor::UInt(Width::W32)),
    }],
};

/// Declares a decodable field but never hands it out.
struct Sealed {
    value: u32,
}

impl Record for Sealed {
    fn layout(&self) -> &'static RecordLayout {
        &SEALED
    }

    fn field(&mut self, _: usize) -> Result<FieldTarget<'_>, Error> {
        Ok(FieldTarget::Absent)
    }
}

impl Decode for Sealed {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Record(&SEALED)
    }

    fn target(&mut self) -> Target<'_> {
        Target::Record(self)
    }
}

#[test]
fn unwritable_field_is_invalid_argument() {
    let mut sealed = Sealed { value: 7 };
    let err = decode(&mut sealed, &[0, 0, 0, 1], ByteOrder::Big).unwrap_err();

    assert!(matches!(
        err,
        Error::InvalidArgument {
            record: "Sealed",
            field: "value"
        }
    ));
    assert_eq!(sealed.value, 7);
}

static MANUAL: RecordLayout = RecordLayout {
    name: "Manual",
    fields: &[
        FieldDescriptor {
            name: "kind",
            kind: FieldKind::Value(TypeDescriptor::UInt(Width::W8)),
        },
        FieldDescriptor {
            name: "body",
            kind: FieldKind::Hook {
                encode: "encode_body",
                decode: "decode_body",
            },
        },
    ],
};

/// Binds its hook only when `wired` is set.
struct Manual {
    wired: bool,
    kind: u8,
    body: [u8; 2],
}

impl Manual {
    fn decode_body(&mut self, r: &[u8]) -> Result<usize, Error> {
        let body = r.get(..2).ok_or_else(|| Error::codec("short body"))?;
        self.body.copy_from_slice(body);
        Ok(2)
    }
}

impl Record for Manual {
    fn layout(&self) -> &'static RecordLayout {
        &MANUAL
    }

    fn field(&mut self, index: usize) -> Result<FieldTarget<'_>, Error> {
        Ok(match index {
            0 => FieldTarget::Value(&mut self.kind),
            1 if self.wired => return hook::bind(self, Self::decode_body, "Manual", "decode_body"),
            _ => FieldTarget::Absent,
        })
    }
}

impl Decode for Manual {
    fn descriptor(&self) -> TypeDescriptor {
        TypeDescriptor::Record(&MANUAL)
    }

    fn target(&mut self) -> Target<'_> {
        Target::Record(self)
    }
}

#[test]
fn manual_hook_binds() {
    let mut manual = Manual {
        wired: true,
        kind: 0,
        body: [0; 2],
    };
    let consumed = decode(&mut manual, &[0x01, 0xCA, 0xFE], ByteOrder::Big).unwrap();

    assert_eq!(consumed, 3);
    assert_eq!(manual.kind, 1);
    assert_eq!(manual.body, [0xCA, 0xFE]);
}

#[test]
fn missing_hook_is_not_found() {
    let mut manual = Manual {
        wired: false,
        kind: 0,
        body: [0; 2],
    };
    let err = decode(&mut manual, &[0x01, 0xCA, 0xFE], ByteOrder::Big).unwrap_err();

    assert!(matches!(
        err,
        Error::CodecNotFound {
            record: "Manual",
            method: "decode_body"
        }
    ));
    assert_eq!(manual.kind, 1);
    assert_eq!(manual.body, [0; 2]);
}
