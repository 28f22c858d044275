//! JSON Lines (NDJSON) helpers for streaming op scripts.
//!
//! An op script is a sequence of [`Op`] records, one JSON object per line,
//! replayed in order against a [`FunctionMaxima`]. The reader is an iterator
//! that *owns* its underlying file, yielding `Result<Op>` so callers can
//! surface per-line errors; the writer uses `serde_json::to_writer` to avoid
//! intermediate allocations. Both `.jsonl` and `.ndjson` are treated as
//! equivalent line-delimited JSON.

use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::Path;

use crate::maxima::FunctionMaxima;

/// One mutation of the function, as an op-script line.
///
/// Serialized form: `{"op":"set","arg":…,"value":…}` or
/// `{"op":"erase","arg":…}`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op<A, V> {
    /// `set_value(arg, value)`.
    Set {
        /// Argument to set.
        arg: A,
        /// Value to set it to.
        value: V,
    },
    /// `erase(arg)`.
    Erase {
        /// Argument to erase.
        arg: A,
    },
}

impl<A: Ord + Clone, V: Ord> Op<A, V> {
    /// Replay this operation against a function.
    pub fn apply(self, f: &mut FunctionMaxima<A, V>) {
        match self {
            Self::Set { arg, value } => f.set_value(arg, value),
            Self::Erase { arg } => f.erase(&arg),
        }
    }
}

/// Owning JSONL iterator over [`Op`] records.
///
/// Holds the file and buffered reader internally to avoid lifetime pitfalls
/// of returning a borrowed `Lines<'_>` iterator.
pub struct JsonlOpIter<A, V> {
    rdr: BufReader<File>,
    buf: String,
    line_no: usize,
    _marker: PhantomData<(A, V)>,
}

impl<A, V> JsonlOpIter<A, V> {
    fn new(file: File) -> Self {
        Self {
            rdr: BufReader::new(file),
            buf: String::with_capacity(256),
            line_no: 0,
            _marker: PhantomData,
        }
    }
}

impl<A: DeserializeOwned, V: DeserializeOwned> Iterator for JsonlOpIter<A, V> {
    type Item = Result<Op<A, V>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buf.clear();
            match self.rdr.read_line(&mut self.buf) {
                Ok(0) => return None, // EOF
                Ok(_) => {
                    self.line_no += 1;
                    // Trim a single trailing '\n' or '\r\n'.
                    if self.buf.ends_with('\n') {
                        self.buf.pop();
                        if self.buf.ends_with('\r') {
                            self.buf.pop();
                        }
                    }
                    if self.buf.is_empty() {
                        continue; // tolerate blank lines
                    }
                    let line_no = self.line_no;
                    return Some(
                        serde_json::from_str(&self.buf)
                            .with_context(|| format!("parse op at line {line_no}")),
                    );
                }
                Err(e) => {
                    return Some(Err(
                        anyhow!(e).context(format!("read line {}", self.line_no + 1))
                    ))
                }
            }
        }
    }
}

/// Open an op script (`.jsonl`/`.ndjson`) as an owning iterator.
pub fn stream_ops_jsonl<A, V, P>(path: P) -> Result<JsonlOpIter<A, V>>
where
    A: DeserializeOwned,
    V: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    Ok(JsonlOpIter::new(f))
}

/// Write an op script, one JSON object per line.
pub fn write_ops_jsonl<A, V, P>(path: P, ops: &[Op<A, V>]) -> Result<()>
where
    A: Serialize,
    V: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let mut w = BufWriter::new(f);
    for op in ops {
        serde_json::to_writer(&mut w, op).with_context(|| "serialize op")?;
        w.write_all(b"\n").with_context(|| "write newline")?;
    }
    w.flush().with_context(|| "flush op script")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    fn tmp_path(name: &str) -> std::path::PathBuf {
        let mut p = std::env::temp_dir();
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        p.push(format!("stepfn_core_jsonl_{name}_{nanos}.jsonl"));
        p
    }

    #[test]
    fn op_wire_shape_is_tagged() {
        let set = serde_json::to_string(&Op::Set { arg: 1i64, value: 10i64 }).unwrap();
        assert_eq!(set, r#"{"op":"set","arg":1,"value":10}"#);
        let erase = serde_json::to_string(&Op::<i64, i64>::Erase { arg: 2 }).unwrap();
        assert_eq!(erase, r#"{"op":"erase","arg":2}"#);
    }

    #[test]
    fn script_roundtrip_and_replay() {
        let path = tmp_path("replay");
        let ops = vec![
            Op::Set { arg: 1i64, value: 10i64 },
            Op::Set { arg: 2, value: 5 },
            Op::Erase { arg: 1 },
        ];
        write_ops_jsonl(&path, &ops).unwrap();

        let mut f = FunctionMaxima::new();
        for op in stream_ops_jsonl::<i64, i64, _>(&path).unwrap() {
            op.unwrap().apply(&mut f);
        }
        assert_eq!(f.len(), 1);
        assert_eq!(f.value_at(&2), Ok(&5));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn blank_lines_are_tolerated_and_garbage_is_an_error() {
        let path = tmp_path("garbage");
        {
            let mut f = File::create(&path).unwrap();
            writeln!(f, r#"{{"op":"set","arg":1,"value":1}}"#).unwrap();
            writeln!(f).unwrap();
            writeln!(f, "not json").unwrap();
        }
        let mut it = stream_ops_jsonl::<i64, i64, _>(&path).unwrap();
        assert!(it.next().unwrap().is_ok());
        let err = it.next().unwrap().unwrap_err();
        assert!(err.to_string().contains("line 3"));
        let _ = std::fs::remove_file(path);
    }
}
