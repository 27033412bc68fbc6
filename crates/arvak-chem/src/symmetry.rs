//! Z2 symmetry detection and qubit tapering.
//!
//! A Z2 symmetry of `H` is a Pauli string `τ` that commutes with every term.
//! For a set of independent, mutually commuting generators `τ_i`, each one is
//! paired with a single-qubit Pauli `σ_i` on a pivot qubit `q_i` such that
//!
//! - `σ_i` anticommutes with `τ_i`
//! - `σ_i` commutes with every `τ_j`, `j ≠ i`
//!
//! The Clifford `U_i = (τ_i + σ_i)/√2` maps `τ_i` to `σ_i`, so in
//! `H' = U H U` qubit `q_i` only carries `I` or `σ_i`. Fixing the eigenvalue
//! `s_i = ±1` (the *sector*) removes the qubit.
//!
//! Generators are kept in reduced row-echelon form over the `[z | x]`
//! symplectic columns; the pivot column of row `i` is the preferred `q_i`,
//! with `σ_i` being `X` (pivot in the z block) or `Z` (pivot in the x block).
//! When pivots of a z-block and an x-block row share a qubit, the partner
//! moves to another qubit that satisfies both conditions.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChemError, ChemResult};
use crate::mapping::QubitMapper;
use crate::operator::{QubitOperator, TermAccumulator};
use crate::pauli::{Pauli, PauliString, full_mask, phase_factor, remove_bits};

/// A tapering specification: generators, their single-qubit partners, and
/// (once chosen) the sector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Z2Symmetries {
    num_qubits: u32,
    symmetries: Vec<PauliString>,
    sq_paulis: Vec<PauliString>,
    sq_qubits: Vec<u32>,
    sector: Option<Vec<i8>>,
}

fn failure(msg: impl Into<String>) -> ChemError {
    ChemError::SymmetryReductionFailure(msg.into())
}

/// Pack a string as `[z | x]` (z in the low `n` bits).
fn pack_zx(p: &PauliString) -> u128 {
    u128::from(p.z_mask()) | (u128::from(p.x_mask()) << p.num_qubits())
}

fn unpack_zx(v: u128, n: u32) -> ChemResult<PauliString> {
    let low = u128::from(full_mask(n));
    PauliString::from_masks(n, ((v >> n) & low) as u64, (v & low) as u64)
}

/// Gauss-Jordan elimination over GF(2); returns the pivot column of each row
/// and drops zero rows.
fn rref(rows: &mut Vec<u128>, num_cols: u32) -> Vec<u32> {
    let mut pivots = Vec::new();
    let mut rank = 0;
    for col in 0..num_cols {
        let bit = 1u128 << col;
        let Some(found) = (rank..rows.len()).find(|&r| rows[r] & bit != 0) else {
            continue;
        };
        rows.swap(rank, found);
        let pivot_row = rows[rank];
        for (r, row) in rows.iter_mut().enumerate() {
            if r != rank && *row & bit != 0 {
                *row ^= pivot_row;
            }
        }
        pivots.push(col);
        rank += 1;
        if rank == rows.len() {
            break;
        }
    }
    rows.truncate(rank);
    pivots
}

/// Basis of `{v : row · v = 0 mod 2 for every row}`.
fn gf2_kernel(mut rows: Vec<u128>, num_cols: u32) -> Vec<u128> {
    let pivots = rref(&mut rows, num_cols);
    (0..num_cols)
        .filter(|c| !pivots.contains(c))
        .map(|free| {
            let mut v = 1u128 << free;
            for (row, &pivot) in rows.iter().zip(&pivots) {
                if row & (1u128 << free) != 0 {
                    v |= 1u128 << pivot;
                }
            }
            v
        })
        .collect()
}

/// Single-qubit Paulis that anticommute with `taus[i]` and commute with every
/// other generator, pivot qubit first.
fn partner_candidates(
    taus: &[PauliString],
    i: usize,
    pivot_qubit: u32,
) -> ChemResult<Vec<(u32, PauliString)>> {
    let n = taus[i].num_qubits();
    let qubits = std::iter::once(pivot_qubit).chain((0..n).filter(|&q| q != pivot_qubit));
    let mut out = Vec::new();
    for qubit in qubits {
        for pauli in [Pauli::X, Pauli::Z] {
            let sigma = PauliString::from_ops(n, [(qubit, pauli)])?;
            let fits = taus
                .iter()
                .enumerate()
                .all(|(j, tau)| tau.commutes_with(&sigma) != (i == j));
            if fits {
                out.push((qubit, sigma));
            }
        }
    }
    Ok(out)
}

/// Pick one candidate per generator on pairwise distinct qubits.
fn assign_partners(
    candidates: &[Vec<(u32, PauliString)>],
    chosen: &mut Vec<(u32, PauliString)>,
) -> bool {
    let Some(options) = candidates.get(chosen.len()) else {
        return true;
    };
    for &(qubit, sigma) in options {
        if chosen.iter().any(|(q, _)| *q == qubit) {
            continue;
        }
        chosen.push((qubit, sigma));
        if assign_partners(candidates, chosen) {
            return true;
        }
        chosen.pop();
    }
    false
}

impl Z2Symmetries {
    /// Tapering specification for the given generators.
    ///
    /// The generators are brought to row-echelon form, so the stored set may
    /// differ from the input by products of its elements; sectors always
    /// refer to the stored set (see [`symmetries`](Self::symmetries)).
    pub fn new(num_qubits: u32, generators: Vec<PauliString>) -> ChemResult<Self> {
        for (i, a) in generators.iter().enumerate() {
            if a.num_qubits() != num_qubits {
                return Err(ChemError::QubitCountMismatch {
                    expected: num_qubits,
                    found: a.num_qubits(),
                });
            }
            if a.is_identity() {
                return Err(failure("identity is not a usable symmetry generator"));
            }
            if let Some(b) = generators[i + 1..].iter().find(|b| !a.commutes_with(b)) {
                return Err(failure(format!("generators {a} and {b} anticommute")));
            }
        }

        let mut rows: Vec<u128> = generators.iter().map(pack_zx).collect();
        let pivots = rref(&mut rows, 2 * num_qubits);
        if rows.len() != generators.len() {
            return Err(failure(format!(
                "{} generators are not independent (rank {})",
                generators.len(),
                rows.len()
            )));
        }

        let symmetries = rows
            .into_iter()
            .map(|row| unpack_zx(row, num_qubits))
            .collect::<ChemResult<Vec<_>>>()?;
        let candidates = pivots
            .iter()
            .enumerate()
            .map(|(i, &pivot)| partner_candidates(&symmetries, i, pivot % num_qubits))
            .collect::<ChemResult<Vec<_>>>()?;

        let mut partners = Vec::with_capacity(symmetries.len());
        if !assign_partners(&candidates, &mut partners) {
            return Err(failure(format!(
                "no distinct single-qubit partners for generators {}",
                symmetries
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            )));
        }
        let (sq_qubits, sq_paulis) = partners.into_iter().unzip();
        Ok(Self {
            num_qubits,
            symmetries,
            sq_paulis,
            sq_qubits,
            sector: None,
        })
    }

    /// Find a maximal set of independent, commuting Z2 symmetries of `op`.
    ///
    /// Diagonal candidates are preferred so the sector can be read off a
    /// computational basis reference.
    pub fn find(op: &QubitOperator) -> ChemResult<Self> {
        let n = op.num_qubits();
        // row [t_x | t_z] against kernel vector [v_z | v_x]
        let rows: Vec<u128> = op
            .terms()
            .iter()
            .map(|t| u128::from(t.pauli.x_mask()) | (u128::from(t.pauli.z_mask()) << n))
            .collect();

        let mut candidates = gf2_kernel(rows, 2 * n)
            .into_iter()
            .map(|v| unpack_zx(v, n))
            .collect::<ChemResult<Vec<_>>>()?;
        candidates.sort_by_key(|p| !p.is_diagonal());

        let mut chosen: Vec<PauliString> = Vec::new();
        for c in candidates {
            if chosen.iter().all(|p| p.commutes_with(&c)) {
                chosen.push(c);
            }
        }
        debug!(num_qubits = n, found = chosen.len(), "Z2 symmetry search");
        Self::new(n, chosen)
    }

    /// The particle-number symmetries of the Parity encoding.
    ///
    /// Generators `Z_{N/2−1}` (α parity) and `Z_{N−1}` (total parity) with
    /// sector `[(−1)^{N_α}, (−1)^{N_α+N_β}]`.
    pub fn two_qubit_reduction(
        mapper: &dyn QubitMapper,
        num_modes: u32,
        num_particles: (usize, usize),
    ) -> ChemResult<Self> {
        if !mapper.allows_two_qubit_reduction() {
            return Err(failure(format!(
                "{} mapping does not support the two-qubit reduction",
                mapper.scheme()
            )));
        }
        if num_modes < 2 || num_modes % 2 != 0 {
            return Err(failure(format!(
                "two-qubit reduction needs an even number of modes, got {num_modes}"
            )));
        }
        let (num_alpha, num_beta) = num_particles;
        let half = num_modes / 2;
        let generators = vec![
            PauliString::from_ops(num_modes, [(half - 1, Pauli::Z)])?,
            PauliString::from_ops(num_modes, [(num_modes - 1, Pauli::Z)])?,
        ];
        let parity = |count: usize| if count % 2 == 0 { 1 } else { -1 };
        Self::new(num_modes, generators)?
            .with_sector(vec![parity(num_alpha), parity(num_alpha + num_beta)])
    }

    /// Fail unless at least `min` generators are present.
    pub fn ensure_at_least(self, min: usize) -> ChemResult<Self> {
        if self.symmetries.len() < min {
            return Err(failure(format!(
                "expected at least {min} symmetries, found {}",
                self.symmetries.len()
            )));
        }
        Ok(self)
    }

    /// Select the sector explicitly (one `±1` per generator).
    pub fn with_sector(mut self, sector: Vec<i8>) -> ChemResult<Self> {
        if sector.len() != self.symmetries.len() {
            return Err(failure(format!(
                "sector has {} entries for {} generators",
                sector.len(),
                self.symmetries.len()
            )));
        }
        if sector.iter().any(|s| *s != 1 && *s != -1) {
            return Err(failure(format!("sector values must be ±1, got {sector:?}")));
        }
        self.sector = Some(sector);
        Ok(self)
    }

    /// Select the sector containing a computational basis reference state.
    pub fn with_reference_sector(self, reference: u64) -> ChemResult<Self> {
        let sector = self.reference_eigenvalues(reference)?;
        self.with_sector(sector)
    }

    fn reference_eigenvalues(&self, reference: u64) -> ChemResult<Vec<i8>> {
        self.symmetries
            .iter()
            .map(|tau| {
                if tau.is_diagonal() {
                    Ok(tau.basis_eigenvalue(reference))
                } else {
                    Err(failure(format!(
                        "generator {tau} is not diagonal, a basis reference has no eigenvalue"
                    )))
                }
            })
            .collect()
    }

    /// Width before tapering.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Width after tapering.
    pub fn reduced_num_qubits(&self) -> u32 {
        self.num_qubits - self.symmetries.len() as u32
    }

    /// Number of generators (qubits removed).
    pub fn len(&self) -> usize {
        self.symmetries.len()
    }

    /// True if nothing would be tapered.
    pub fn is_empty(&self) -> bool {
        self.symmetries.is_empty()
    }

    /// Generators `τ_i`.
    pub fn symmetries(&self) -> &[PauliString] {
        &self.symmetries
    }

    /// Single-qubit partners `σ_i`.
    pub fn single_qubit_paulis(&self) -> &[PauliString] {
        &self.sq_paulis
    }

    /// Pivot qubits `q_i`, removed by tapering.
    pub fn tapered_qubits(&self) -> &[u32] {
        &self.sq_qubits
    }

    /// Selected sector, if any.
    pub fn sector(&self) -> Option<&[i8]> {
        self.sector.as_deref()
    }

    /// True if every generator commutes with every term of `op`.
    pub fn commutes_with(&self, op: &QubitOperator) -> bool {
        self.symmetries.iter().all(|tau| op.commutes_with_pauli(tau))
    }

    /// Apply `U = Π_i (τ_i + σ_i)/√2`, fix the sector and drop the pivot qubits.
    pub fn taper(&self, op: &QubitOperator) -> ChemResult<QubitOperator> {
        if op.num_qubits() != self.num_qubits {
            return Err(ChemError::QubitCountMismatch {
                expected: self.num_qubits,
                found: op.num_qubits(),
            });
        }
        if self.symmetries.is_empty() {
            return Ok(op.clone());
        }
        let sector = self
            .sector
            .as_ref()
            .ok_or_else(|| failure("no sector selected"))?;

        let mut acc = TermAccumulator::with_capacity(op.num_terms());
        for term in op.terms() {
            if let Some(tau) = self
                .symmetries
                .iter()
                .find(|tau| !term.pauli.commutes_with(tau))
            {
                return Err(failure(format!(
                    "term {} does not commute with symmetry {tau}",
                    term.pauli
                )));
            }

            let mut pauli = term.pauli;
            let mut coeff = term.coeff;
            // U P U = P when P commutes with σ, P·τ·σ otherwise
            for (tau, sigma) in self.symmetries.iter().zip(&self.sq_paulis) {
                if !pauli.commutes_with(sigma) {
                    let (p1, k1) = pauli.compose(tau);
                    let (p2, k2) = p1.compose(sigma);
                    coeff *= phase_factor((k1 + k2) % 4);
                    pauli = p2;
                }
            }

            for ((&qubit, sigma), &s) in self.sq_qubits.iter().zip(&self.sq_paulis).zip(sector) {
                match pauli.get(qubit) {
                    Pauli::I => {}
                    p if p == sigma.get(qubit) => coeff *= Complex64::new(f64::from(s), 0.0),
                    p => {
                        return Err(failure(format!(
                            "term {} leaves {p:?} on tapered qubit {qubit}",
                            term.pauli
                        )));
                    }
                }
            }
            acc.add(pauli.remove_qubits(&self.sq_qubits), coeff);
        }

        let tapered = QubitOperator::from_accumulator(self.reduced_num_qubits(), acc);
        debug!(
            from_qubits = self.num_qubits,
            to_qubits = tapered.num_qubits(),
            terms = tapered.num_terms(),
            "tapered operator"
        );
        Ok(tapered)
    }

    /// Reference basis state expressed on the tapered register.
    ///
    /// Requires diagonal generators and a reference inside the chosen sector.
    pub fn taper_reference(&self, reference: u64) -> ChemResult<u64> {
        let eigenvalues = self.reference_eigenvalues(reference)?;
        if let Some(sector) = &self.sector {
            if *sector != eigenvalues {
                return Err(failure(format!(
                    "reference lies in sector {eigenvalues:?}, tapering selects {sector:?}"
                )));
            }
        }
        Ok(remove_bits(reference, self.num_qubits, &self.sq_qubits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{JordanWignerMapper, ParityMapper};

    fn ps(label: &str) -> PauliString {
        PauliString::from_label(label).unwrap()
    }

    #[test]
    fn test_kernel_vectors_commute_with_rows() {
        let op = QubitOperator::from_labels([("ZZI", 1.0), ("XXI", 0.5), ("IIZ", 0.2)]).unwrap();
        let found = Z2Symmetries::find(&op).unwrap();
        assert!(!found.is_empty());
        for tau in found.symmetries() {
            assert!(op.commutes_with_pauli(tau), "{tau}");
        }
    }

    #[test]
    fn test_pairing_properties() {
        let z2 = Z2Symmetries::new(4, vec![ps("ZZII"), ps("ZIZI"), ps("ZIIZ")]).unwrap();
        assert_eq!(z2.len(), 3);
        for (i, (tau, sigma)) in z2.symmetries().iter().zip(z2.single_qubit_paulis()).enumerate() {
            assert!(!tau.commutes_with(sigma));
            for (j, other) in z2.symmetries().iter().enumerate() {
                if i != j {
                    assert!(other.commutes_with(sigma));
                }
            }
        }
        assert_eq!(z2.reduced_num_qubits(), 1);
    }

    #[test]
    fn test_shared_pivot_moves_partner() {
        // ZZ pivots on z0, XX on x0: both prefer qubit 0
        let z2 = Z2Symmetries::new(2, vec![ps("ZZ"), ps("XX")]).unwrap();
        assert_eq!(z2.len(), 2);
        assert_eq!(z2.tapered_qubits(), &[0, 1]);
        assert_eq!(z2.single_qubit_paulis(), &[ps("IX"), ps("ZI")]);
    }

    #[test]
    fn test_dependent_generators_rejected() {
        let err = Z2Symmetries::new(3, vec![ps("ZZI"), ps("IZZ"), ps("ZIZ")]).unwrap_err();
        assert!(matches!(err, ChemError::SymmetryReductionFailure(_)));
    }

    #[test]
    fn test_anticommuting_generators_rejected() {
        let err = Z2Symmetries::new(2, vec![ps("ZI"), ps("XI")]).unwrap_err();
        assert!(matches!(err, ChemError::SymmetryReductionFailure(_)));
    }

    #[test]
    fn test_taper_requires_sector() {
        let z2 = Z2Symmetries::new(2, vec![ps("ZZ")]).unwrap();
        let op = QubitOperator::from_labels([("ZI", 1.0)]).unwrap();
        assert!(matches!(
            z2.taper(&op),
            Err(ChemError::SymmetryReductionFailure(_))
        ));
    }

    #[test]
    fn test_taper_rejects_non_commuting_term() {
        let z2 = Z2Symmetries::new(2, vec![ps("ZZ")])
            .unwrap()
            .with_sector(vec![1])
            .unwrap();
        let op = QubitOperator::from_labels([("XI", 1.0)]).unwrap();
        assert!(matches!(
            z2.taper(&op),
            Err(ChemError::SymmetryReductionFailure(_))
        ));
    }

    #[test]
    fn test_two_qubit_reduction_needs_parity() {
        let err = Z2Symmetries::two_qubit_reduction(&JordanWignerMapper, 4, (1, 1)).unwrap_err();
        assert!(matches!(err, ChemError::SymmetryReductionFailure(_)));
        let err = Z2Symmetries::two_qubit_reduction(&ParityMapper, 5, (1, 1)).unwrap_err();
        assert!(matches!(err, ChemError::SymmetryReductionFailure(_)));
    }

    #[test]
    fn test_two_qubit_reduction_sector() {
        let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
        assert_eq!(z2.tapered_qubits(), &[1, 3]);
        assert_eq!(z2.sector(), Some(&[-1i8, 1][..]));
        // parity HF state for modes {0, 2}
        assert_eq!(z2.taper_reference(0b0011).unwrap(), 0b01);
    }

    #[test]
    fn test_reference_outside_sector() {
        let z2 = Z2Symmetries::two_qubit_reduction(&ParityMapper, 4, (1, 1)).unwrap();
        assert!(matches!(
            z2.taper_reference(0b0000),
            Err(ChemError::SymmetryReductionFailure(_))
        ));
    }
}
