use super::galois::{EXP_TABLE, GENERATOR_POLYNOMIALS, LOG_TABLE, MAX_EC_SIZE};

// Performs polynomial long division with data polynomial(num)
// and generator polynomial(den) to compute remainder polynomial,
// the coefficients of which are the ecc
pub(crate) fn ecc_per_block(block: &[u8], ecc_count: usize) -> Vec<u8> {
    debug_assert!(
        (1..=MAX_EC_SIZE).contains(&ecc_count),
        "Ecc count should be within 1..={MAX_EC_SIZE}: {ecc_count}"
    );

    let len = block.len();
    let gen_poly = &GENERATOR_POLYNOMIALS[ecc_count][..ecc_count];

    let mut res = block.to_vec();
    res.resize(len + ecc_count, 0);

    for i in 0..len {
        let lead_coeff = res[i] as usize;
        if lead_coeff == 0 {
            continue;
        }

        let log_lead_coeff = LOG_TABLE[lead_coeff] as usize;
        for (u, v) in res[i + 1..].iter_mut().zip(gen_poly.iter()) {
            let log_sum = (*v as usize + log_lead_coeff) % 255;
            *u ^= EXP_TABLE[log_sum];
        }
    }

    res.split_off(len)
}
