use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};

use jtag_vcd::script::{msb_first, DEFAULT_IDCODE};
use jtag_vcd::generate;
use vcd::{Command, IdCode, Parser, TimescaleUnit, Value};

const DATE: &str = "Thu Jan  1 00:00:00 1970";

fn write_fixture(path: &std::path::Path) -> u64 {
    let file = File::create(path).unwrap();
    generate(BufWriter::new(file), DATE).unwrap()
}

#[test]
fn idcode_fixture_is_112_steps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jtag.vcd");
    assert_eq!(write_fixture(&path), 112);
}

#[test]
fn same_date_gives_identical_files() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.vcd");
    let b = dir.path().join("b.vcd");
    write_fixture(&a);
    write_fixture(&b);
    assert_eq!(fs::read(&a).unwrap(), fs::read(&b).unwrap());
}

#[test]
fn rewriting_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jtag.vcd");
    fs::write(&path, vec![b'x'; 64 * 1024]).unwrap();
    write_fixture(&path);

    let mut again = Vec::new();
    generate(&mut again, DATE).unwrap();
    assert_eq!(fs::read(&path).unwrap(), again);
}

#[test]
fn header_and_replayed_tdo() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("jtag.vcd");
    write_fixture(&path);

    let mut parser = Parser::new(BufReader::new(File::open(&path).unwrap()));
    let header = parser.parse_header().unwrap();
    assert_eq!(header.timescale, Some((1, TimescaleUnit::NS)));
    assert_eq!(header.date.as_deref().map(str::trim), Some(DATE));

    let code = |name: &str| -> IdCode {
        let var = header.find_var(&["capture", name]).unwrap();
        assert_eq!(var.size, 1);
        var.code
    };
    let (tck, tdo) = (code("tck"), code("tdo"));
    code("tms");
    code("tdi");

    // Replay the file and sample TDO on every rising edge of TCK
    let mut now = 0;
    let mut values: HashMap<IdCode, Value> = HashMap::new();
    let mut rising = Vec::new();
    for command in parser {
        match command.unwrap() {
            Command::Timestamp(t) => {
                assert!(t >= now);
                now = t;
            }
            Command::ChangeScalar(id, v) => {
                if id == tck && v == Value::V1 && values.get(&tck) != Some(&Value::V1) {
                    rising.push(values.get(&tdo).copied().unwrap_or(Value::V0));
                }
                values.insert(id, v);
            }
            _ => {}
        }
    }
    assert_eq!(now, 111);
    assert_eq!(rising.len(), 56);

    // The IDCODE goes out in periods 22..54, after 6 + 4 TMS, 8 instruction and 4 TMS periods
    let expected: Vec<Value> = msb_first(DEFAULT_IDCODE.into(), 32)
        .into_iter()
        .map(|b| match b {
            embedded_hal::digital::PinState::Low => Value::V0,
            embedded_hal::digital::PinState::High => Value::V1,
        })
        .collect();
    assert_eq!(&rising[22..54], expected.as_slice());
}
