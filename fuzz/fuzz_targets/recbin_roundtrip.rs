#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use recbin::{Item, Stream};

#[derive(Debug, Arbitrary)]
enum Value {
    Int(u64),
    Bytes(Vec<u8>),
    List(Vec<Value>),
}

fn append(value: &Value, stream: &mut Stream) {
    match value {
        Value::Int(x) => {
            stream.append_int(*x);
        }
        Value::Bytes(bytes) => {
            stream.append_bytes(bytes);
        }
        Value::List(items) => {
            stream.append_list(items.len());
            for item in items {
                append(item, stream);
            }
        }
    }
}

fn check(value: &Value, item: Item<'_>) {
    match value {
        Value::Int(x) => {
            assert!(item.is_int());
            assert_eq!(item.to_u64(), *x);
        }
        Value::Bytes(bytes) => {
            assert!(item.is_string());
            assert_eq!(item.as_bytes(), bytes.as_slice());
        }
        Value::List(items) => {
            assert!(item.is_list());
            assert_eq!(item.item_count().unwrap(), items.len());
            for (child, expected) in item.iter().zip(items) {
                check(expected, child.unwrap());
            }
        }
    }
}

fuzz_target!(|input: (Value, Vec<u8>)| {
    let (value, raw) = input;

    // whatever we encode must decode back to the same value
    let mut stream = Stream::new();
    append(&value, &mut stream);
    let out = stream.out();
    let item = Item::new(&out);
    item.validate().expect("own encodings must validate");
    assert_eq!(item.size().unwrap(), out.len());
    check(&value, item);

    // and arbitrary buffers must never panic or read out of bounds
    let item = Item::new(&raw);
    let _ = item.validate();
    let _ = item.size();
    let _ = item.to_u64();
    let _ = item.to_u256();
    let _ = item.as_bytes();
    let _ = item.int_be_bytes();
    let _ = item.to_string();
});
