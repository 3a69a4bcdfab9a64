//! CPF (Cadastro de Pessoas Físicas) numbers.
//!
//! A CPF is nine base digits followed by two mod-11 check digits. It is
//! written either bare (`52998224725`) or punctuated (`529.982.247-25`).

const LEN: usize = 11;

/// Positions of the punctuation in the formatted `000.000.000-00` form.
const FORMATTED: [(usize, u8); 3] = [(3, b'.'), (7, b'.'), (11, b'-')];

/// Whether `input`, bare or punctuated, carries correct check digits.
///
/// Sequences of a single repeated digit pass the checksum but are not issued,
/// so they are rejected.
pub fn is_valid(input: &str) -> bool {
  let Some(digits) = digits(input) else {
    return false;
  };
  if digits.iter().all(|d| *d == digits[0]) {
    return false;
  }
  digits[9] == check_digit(&digits[..9])
    && digits[10] == check_digit(&digits[..10])
}

/// Append the two check digits to nine base digits.
pub fn with_check_digits(base: &str) -> Option<String> {
  if base.len() != 9 || !base.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  let mut digits: Vec<u8> = base.bytes().map(|b| b - b'0').collect();
  digits.push(check_digit(&digits));
  digits.push(check_digit(&digits));
  Some(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Parse the bare or punctuated form into its digit values.
fn digits(input: &str) -> Option<[u8; LEN]> {
  let bytes = input.as_bytes();
  let bare: Vec<u8> = match bytes.len() {
    LEN => bytes.to_vec(),
    14 => {
      if FORMATTED.iter().any(|(i, c)| bytes[*i] != *c) {
        return None;
      }
      bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| FORMATTED.iter().all(|(p, _)| p != i))
        .map(|(_, b)| *b)
        .collect()
    }
    _ => return None,
  };

  let mut out = [0u8; LEN];
  for (slot, b) in out.iter_mut().zip(&bare) {
    if !b.is_ascii_digit() {
      return None;
    }
    *slot = b - b'0';
  }
  Some(out)
}

/// Weighted mod-11 digit over `digits`; weights run from `len + 1` down to 2.
fn check_digit(digits: &[u8]) -> u8 {
  let top = digits.len() as u32 + 1;
  let sum: u32 = digits
    .iter()
    .enumerate()
    .map(|(i, d)| u32::from(*d) * (top - i as u32))
    .sum();
  match (sum * 10) % 11 {
    10 => 0,
    r => r as u8,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_bare_and_formatted() {
    assert!(is_valid("52998224725"));
    assert!(is_valid("529.982.247-25"));
  }

  #[test]
  fn rejects_wrong_check_digits() {
    assert!(!is_valid("12345678901"));
    assert!(!is_valid("52998224726"));
    assert!(is_valid("12345678909"));
  }

  #[test]
  fn rejects_repeated_digits() {
    assert!(!is_valid("00000000000"));
    assert!(!is_valid("111.111.111-11"));
  }

  #[test]
  fn rejects_malformed_input() {
    assert!(!is_valid(""));
    assert!(!is_valid("5299822472"));
    assert!(!is_valid("529-982-247.25"));
    assert!(!is_valid("5299822472a"));
    assert!(!is_valid("529.982.24725"));
  }

  #[test]
  fn generated_numbers_validate() {
    for base in ["100000001", "529982247", "987654321"] {
      let cpf = with_check_digits(base).unwrap();
      assert!(cpf.starts_with(base));
      assert!(is_valid(&cpf), "{cpf}");
    }
    assert_eq!(with_check_digits("529982247").as_deref(), Some("52998224725"));
    assert!(with_check_digits("12345").is_none());
  }
}
