// Galois field GF(256) with primitive polynomial x^8 + x^4 + x^3 + x^2 + 1
//------------------------------------------------------------------------------

const PRIMITIVE_POLY: u16 = 0x11d;

pub const MAX_EC_SIZE: usize = 30;

const fn build_tables() -> ([u8; 256], [u8; 256]) {
    let mut exp = [0u8; 256];
    let mut log = [0u8; 256];
    let mut x: u16 = 1;
    let mut i = 0;
    while i < 255 {
        exp[i] = x as u8;
        log[x as usize] = i as u8;
        x <<= 1;
        if x & 0x100 != 0 {
            x ^= PRIMITIVE_POLY;
        }
        i += 1;
    }
    exp[255] = exp[0];
    (exp, log)
}

const TABLES: ([u8; 256], [u8; 256]) = build_tables();

pub static EXP_TABLE: [u8; 256] = TABLES.0;
pub static LOG_TABLE: [u8; 256] = TABLES.1;

const fn mul(a: u8, b: u8) -> u8 {
    if a == 0 || b == 0 {
        return 0;
    }
    let log_sum = (TABLES.1[a as usize] as usize + TABLES.1[b as usize] as usize) % 255;
    TABLES.0[log_sum]
}

// Generator polynomial of degree k is (x - a^0)(x - a^1)...(x - a^(k-1)). Row k holds its
// coefficients below the leading 1, highest degree first, as logarithms.
const fn build_generator_polynomials() -> [[u8; MAX_EC_SIZE]; MAX_EC_SIZE + 1] {
    let mut res = [[0u8; MAX_EC_SIZE]; MAX_EC_SIZE + 1];
    let mut k = 1;
    while k <= MAX_EC_SIZE {
        let mut poly = [0u8; MAX_EC_SIZE + 1];
        poly[0] = 1;
        let mut i = 0;
        while i < k {
            let root = TABLES.0[i];
            let mut j = i + 1;
            while j > 0 {
                poly[j] ^= mul(poly[j - 1], root);
                j -= 1;
            }
            i += 1;
        }
        let mut j = 0;
        while j < k {
            res[k][j] = TABLES.1[poly[j + 1] as usize];
            j += 1;
        }
        k += 1;
    }
    res
}

pub static GENERATOR_POLYNOMIALS: [[u8; MAX_EC_SIZE]; MAX_EC_SIZE + 1] =
    build_generator_polynomials();
