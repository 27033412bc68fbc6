//! Pauli strings in symplectic form.
//!
//! A Pauli string on `n` qubits is stored as two bit masks `(x, z)`:
//!
//! | x | z | Pauli |
//! |---|---|-------|
//! | 0 | 0 | I     |
//! | 1 | 0 | X     |
//! | 0 | 1 | Z     |
//! | 1 | 1 | Y     |
//!
//! With the convention `P = i^{|x ∧ z|} X^x Z^z`, products and commutation
//! checks reduce to popcounts on the masks.
//!
//! Labels are written with qubit 0 as the *rightmost* character, so
//! `"ZIXY"` means `Z₃ X₁ Y₀`.
//!
//! # Example
//!
//! ```rust
//! use arvak_chem::pauli::{Pauli, PauliString};
//!
//! let xy = PauliString::from_label("XY").unwrap();
//! assert_eq!(xy.get(0), Pauli::Y);
//! assert_eq!(xy.get(1), Pauli::X);
//!
//! let yx = PauliString::from_label("YX").unwrap();
//! assert!(xy.commutes_with(&yx));
//! ```

use std::fmt;

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::{ChemError, ChemResult};

/// Widest register representable by a pair of `u64` masks.
pub const MAX_QUBITS: u32 = 64;

/// Single-qubit Pauli operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pauli {
    /// Identity.
    I,
    /// Pauli-X.
    X,
    /// Pauli-Y.
    Y,
    /// Pauli-Z.
    Z,
}

impl Pauli {
    /// Parse one label character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::I),
            'X' => Some(Self::X),
            'Y' => Some(Self::Y),
            'Z' => Some(Self::Z),
            _ => None,
        }
    }

    /// Label character.
    pub fn as_char(self) -> char {
        match self {
            Self::I => 'I',
            Self::X => 'X',
            Self::Y => 'Y',
            Self::Z => 'Z',
        }
    }

    fn bits(self) -> (bool, bool) {
        match self {
            Self::I => (false, false),
            Self::X => (true, false),
            Self::Y => (true, true),
            Self::Z => (false, true),
        }
    }
}

/// `i^k` for a phase exponent `k` taken mod 4.
pub fn phase_factor(k: u8) -> Complex64 {
    match k % 4 {
        0 => Complex64::new(1.0, 0.0),
        1 => Complex64::new(0.0, 1.0),
        2 => Complex64::new(-1.0, 0.0),
        _ => Complex64::new(0.0, -1.0),
    }
}

/// Mask with the lowest `n` bits set.
pub(crate) fn full_mask(n: u32) -> u64 {
    if n >= MAX_QUBITS {
        u64::MAX
    } else {
        (1u64 << n) - 1
    }
}

/// A tensor product of Pauli operators on a fixed-width register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PauliString {
    num_qubits: u32,
    x: u64,
    z: u64,
}

impl PauliString {
    /// The identity on `num_qubits` qubits.
    pub fn identity(num_qubits: u32) -> ChemResult<Self> {
        Self::from_masks(num_qubits, 0, 0)
    }

    /// Build from raw symplectic masks.
    ///
    /// Bits above `num_qubits` must be clear.
    pub fn from_masks(num_qubits: u32, x: u64, z: u64) -> ChemResult<Self> {
        if num_qubits > MAX_QUBITS {
            return Err(ChemError::TooManyQubits(num_qubits));
        }
        let outside = !full_mask(num_qubits);
        if (x | z) & outside != 0 {
            let highest = 63 - (x | z).leading_zeros();
            return Err(ChemError::QubitCountMismatch {
                expected: num_qubits,
                found: highest + 1,
            });
        }
        Ok(Self { num_qubits, x, z })
    }

    /// Build from `(qubit, pauli)` pairs; unlisted qubits are identity.
    ///
    /// A qubit listed twice keeps its last entry.
    pub fn from_ops(
        num_qubits: u32,
        ops: impl IntoIterator<Item = (u32, Pauli)>,
    ) -> ChemResult<Self> {
        let mut out = Self::identity(num_qubits)?;
        for (qubit, pauli) in ops {
            if qubit >= num_qubits {
                return Err(ChemError::QubitCountMismatch {
                    expected: num_qubits,
                    found: qubit + 1,
                });
            }
            out.set(qubit, pauli);
        }
        Ok(out)
    }

    /// Parse a label such as `"IXZY"` (qubit 0 rightmost).
    pub fn from_label(label: &str) -> ChemResult<Self> {
        let num_qubits = u32::try_from(label.chars().count())
            .map_err(|_| ChemError::InvalidPauliLabel(label.to_string()))?;
        let mut out = Self::identity(num_qubits)?;
        for (pos, c) in label.chars().enumerate() {
            let pauli =
                Pauli::from_char(c).ok_or_else(|| ChemError::InvalidPauliLabel(label.to_string()))?;
            out.set(num_qubits - 1 - pos as u32, pauli);
        }
        Ok(out)
    }

    /// Register width.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// X part of the symplectic representation.
    pub fn x_mask(&self) -> u64 {
        self.x
    }

    /// Z part of the symplectic representation.
    pub fn z_mask(&self) -> u64 {
        self.z
    }

    /// Pauli acting on `qubit`.
    pub fn get(&self, qubit: u32) -> Pauli {
        let bit = 1u64 << qubit;
        match (self.x & bit != 0, self.z & bit != 0) {
            (false, false) => Pauli::I,
            (true, false) => Pauli::X,
            (true, true) => Pauli::Y,
            (false, true) => Pauli::Z,
        }
    }

    /// Overwrite the Pauli acting on `qubit`.
    pub fn set(&mut self, qubit: u32, pauli: Pauli) {
        let bit = 1u64 << qubit;
        let (x, z) = pauli.bits();
        self.x = if x { self.x | bit } else { self.x & !bit };
        self.z = if z { self.z | bit } else { self.z & !bit };
    }

    /// Number of non-identity factors.
    pub fn weight(&self) -> u32 {
        (self.x | self.z).count_ones()
    }

    /// True if every factor is I.
    pub fn is_identity(&self) -> bool {
        self.x == 0 && self.z == 0
    }

    /// True if only I and Z appear (diagonal in the computational basis).
    pub fn is_diagonal(&self) -> bool {
        self.x == 0
    }

    /// Symplectic inner product test: `P Q = Q P`.
    pub fn commutes_with(&self, other: &Self) -> bool {
        ((self.x & other.z).count_ones() + (self.z & other.x).count_ones()) % 2 == 0
    }

    /// Product `self · other = i^k · R`; returns `(R, k)`.
    pub fn compose(&self, other: &Self) -> (Self, u8) {
        let x = self.x ^ other.x;
        let z = self.z ^ other.z;
        let k = (self.x & self.z).count_ones() + (other.x & other.z).count_ones()
            + 2 * (self.z & other.x).count_ones()
            + 3 * (x & z).count_ones();
        (
            Self {
                num_qubits: self.num_qubits.max(other.num_qubits),
                x,
                z,
            },
            (k % 4) as u8,
        )
    }

    /// Act on a computational basis state: `P|b⟩ = phase · |b'⟩`.
    pub fn apply_to_basis(&self, index: u64) -> (u64, Complex64) {
        let mut k = (self.x & self.z).count_ones();
        if (self.z & index).count_ones() % 2 == 1 {
            k += 2;
        }
        (index ^ self.x, phase_factor((k % 4) as u8))
    }

    /// Eigenvalue `±1` of a diagonal string on a basis state.
    ///
    /// Off-diagonal strings have no basis eigenvalue; the caller checks
    /// [`is_diagonal`](Self::is_diagonal) first.
    pub fn basis_eigenvalue(&self, index: u64) -> i8 {
        if (self.z & index).count_ones() % 2 == 0 { 1 } else { -1 }
    }

    /// Drop the given qubits and compact the remaining ones downwards.
    pub fn remove_qubits(&self, qubits: &[u32]) -> Self {
        let mut out = Self {
            num_qubits: self.num_qubits - qubits.len() as u32,
            x: 0,
            z: 0,
        };
        let mut target = 0;
        for q in 0..self.num_qubits {
            if qubits.contains(&q) {
                continue;
            }
            out.set(target, self.get(q));
            target += 1;
        }
        out
    }
}

impl fmt::Display for PauliString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for q in (0..self.num_qubits).rev() {
            write!(f, "{}", self.get(q).as_char())?;
        }
        Ok(())
    }
}

/// Drop the bits at `qubits` from a basis index, compacting the rest.
pub fn remove_bits(index: u64, num_qubits: u32, qubits: &[u32]) -> u64 {
    let mut out = 0u64;
    let mut target = 0;
    for q in 0..num_qubits {
        if qubits.contains(&q) {
            continue;
        }
        if index & (1u64 << q) != 0 {
            out |= 1u64 << target;
        }
        target += 1;
    }
    out
}
