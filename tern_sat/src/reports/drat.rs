/*!
A DRAT proof writer.

The stream records every clause addition and deletion made after parsing, in
one of two encodings:

- **Text**: `l1 l2 … 0` per addition, `d l1 l2 … 0` per deletion, with
  literals as signed DIMACS integers.
- **Binary** ("vbyte"): a leading `a` or `d` byte, then each literal encoded
  as `2·(atom + 1) + sign` in 7-bit groups, least significant first, with
  the high bit as a continuation marker, terminated by the literal `0`.

On an unsatisfiable outcome the stream ends with the addition of the empty
clause.
*/

use std::io::{self, Write};

use crate::structures::literal::Literal;

/// A clause addition/deletion stream in DRAT format.
pub struct ProofWriter {
    out: Box<dyn Write>,
    binary: bool,
}

impl ProofWriter {
    pub fn new(out: Box<dyn Write>, binary: bool) -> Self {
        ProofWriter { out, binary }
    }

    /// Record the addition of a clause.
    pub fn add(&mut self, literals: &[Literal]) {
        let _ = self.record(literals, true);
    }

    /// Record the deletion of a clause.
    pub fn delete(&mut self, literals: &[Literal]) {
        let _ = self.record(literals, false);
    }

    /// Record the addition of the empty clause and flush.
    pub fn conclude_unsatisfiable(&mut self) {
        let _ = self.record(&[], true);
        let _ = self.out.flush();
    }

    fn record(&mut self, literals: &[Literal], add: bool) -> io::Result<()> {
        if self.binary {
            self.out.write_all(&[if add { b'a' } else { b'd' }])?;
            for literal in literals {
                self.write_vbyte(vbyte_code(*literal))?;
            }
            self.write_vbyte(0)?;
        } else {
            if !add {
                self.out.write_all(b"d ")?;
            }
            for literal in literals {
                write!(self.out, "{} ", literal.as_dimacs())?;
            }
            self.out.write_all(b"0\n")?;
            self.out.flush()?;
        }
        Ok(())
    }

    fn write_vbyte(&mut self, mut n: u32) -> io::Result<()> {
        while n > 127 {
            self.out.write_all(&[(128 | (n & 127)) as u8])?;
            n >>= 7;
        }
        self.out.write_all(&[n as u8])
    }
}

fn vbyte_code(literal: Literal) -> u32 {
    2 * (literal.atom() as u32 + 1) + !literal.polarity() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    // A handle into a shared buffer, as the writer takes its sink by value.
    #[derive(Clone, Default)]
    struct Sink(Rc<RefCell<Vec<u8>>>);

    impl Write for Sink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn lits(ints: &[i32]) -> Vec<Literal> {
        ints.iter().map(|&i| Literal::from_dimacs(i)).collect()
    }

    #[test]
    fn text_records() {
        let sink = Sink::default();
        let mut writer = ProofWriter::new(Box::new(sink.clone()), false);

        writer.add(&lits(&[1, -2]));
        writer.delete(&lits(&[3]));
        writer.conclude_unsatisfiable();

        let written = String::from_utf8(sink.0.borrow().clone()).unwrap();
        assert_eq!(written, "1 -2 0\nd 3 0\n0\n");
    }

    #[test]
    fn vbyte_records() {
        let sink = Sink::default();
        let mut writer = ProofWriter::new(Box::new(sink.clone()), true);

        // 1 → 2·1 + 0 = 4; -2 → 2·2 + 1 = 5.
        writer.add(&lits(&[1, -2]));
        assert_eq!(*sink.0.borrow(), vec![b'a', 4, 5, 0]);
    }

    #[test]
    fn vbyte_continuation() {
        let sink = Sink::default();
        let mut writer = ProofWriter::new(Box::new(sink.clone()), true);

        // Atom 100 positive → 2·101 = 202 = 0b1100_1010, split into
        // 0b100_1010 with the continuation bit and 0b1.
        writer.add(&lits(&[101]));
        assert_eq!(*sink.0.borrow(), vec![b'a', 0b1100_1010, 0b1, 0]);
    }
}
