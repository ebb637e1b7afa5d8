//! Fixture rendering shared by the integration tests

#![allow(dead_code)]

use image::{GrayImage, Luma};
use qrcode::{Color, QrCode};
use std::path::{Path, PathBuf};

pub const WHITE: u8 = 255;
pub const BLACK: u8 = 0;

/// Module colours of a QR symbol, row-major, `true` = dark
pub fn qr_modules(text: &str) -> (usize, Vec<bool>) {
    let code = QrCode::new(text.as_bytes()).expect("encodable test payload");
    let width = code.width();
    let modules = code.to_colors().into_iter().map(|c| c == Color::Dark).collect();
    (width, modules)
}

/// `side` x `side` canvas of `light` with the QR symbol for `text` centred on
/// it at `scale` pixels per module
pub fn qr_image(text: &str, scale: u32, side: u32, dark: u8, light: u8) -> GrayImage {
    let (width, modules) = qr_modules(text);
    let symbol = width as u32 * scale;
    assert!(symbol + 8 * scale <= side, "symbol does not fit with its quiet zone");
    let origin = (side - symbol) / 2;

    let mut image = GrayImage::from_pixel(side, side, Luma([light]));
    for (i, &is_dark) in modules.iter().enumerate() {
        if !is_dark {
            continue;
        }
        let (mx, my) = ((i % width) as u32, (i / width) as u32);
        for dy in 0..scale {
            for dx in 0..scale {
                image.put_pixel(origin + mx * scale + dx, origin + my * scale + dy, Luma([dark]));
            }
        }
    }
    image
}

/// Paint alternating light/dark module widths (starting light) as vertical
/// bars `height` pixels tall
pub fn bars_image(modules: &[u8], scale: u32, height: u32) -> GrayImage {
    let width: u32 = modules.iter().map(|&m| m as u32 * scale).sum();
    let mut image = GrayImage::from_pixel(width, height, Luma([WHITE]));
    let mut x = 0;
    for (i, &m) in modules.iter().enumerate() {
        let w = m as u32 * scale;
        if i % 2 == 1 {
            for px in x..x + w {
                for y in 0..height {
                    image.put_pixel(px, y, Luma([BLACK]));
                }
            }
        }
        x += w;
    }
    image
}

const EAN_L: [[u8; 4]; 10] = [
    [3, 2, 1, 1],
    [2, 2, 2, 1],
    [2, 1, 2, 2],
    [1, 4, 1, 1],
    [1, 1, 3, 2],
    [1, 2, 3, 1],
    [1, 1, 1, 4],
    [1, 3, 1, 2],
    [1, 2, 1, 3],
    [3, 1, 1, 2],
];
const EAN_PARITY: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// Module widths of an EAN-13 (13 digits) or EAN-8 (8 digits) symbol
pub fn ean_modules(digits: &str) -> Vec<u8> {
    let d: Vec<usize> = digits.bytes().map(|b| (b - b'0') as usize).collect();
    let (left, right, parity) = match d.len() {
        13 => (&d[1..7], &d[7..], EAN_PARITY[d[0]]),
        8 => (&d[..4], &d[4..], 0),
        n => panic!("unsupported EAN length {n}"),
    };
    let mut modules = vec![12, 1, 1, 1];
    for (i, &digit) in left.iter().enumerate() {
        let mut pattern = EAN_L[digit];
        if parity & (1 << (left.len() - 1 - i)) != 0 {
            pattern.reverse();
        }
        modules.extend(pattern);
    }
    modules.extend([1, 1, 1, 1, 1]);
    for &digit in right {
        modules.extend(EAN_L[digit]);
    }
    modules.extend([1, 1, 1, 12]);
    modules
}

const CODE128: [&str; 107] = [
    "212222", "222122", "222221", "121223", "121322", "131222", "122213", "122312", "132212",
    "221213", "221312", "231212", "112232", "122132", "122231", "113222", "123122", "123221",
    "223211", "221132", "221231", "213212", "223112", "312131", "311222", "321122", "321221",
    "312212", "322112", "322211", "212123", "212321", "232121", "111323", "131123", "131321",
    "112313", "132113", "132311", "211313", "231113", "231311", "112133", "112331", "132131",
    "113123", "113321", "133121", "313121", "211331", "231131", "213113", "213311", "213131",
    "311123", "311321", "331121", "312113", "312311", "332111", "314111", "221411", "431111",
    "111224", "111422", "121124", "121421", "141122", "141221", "112214", "112412", "122114",
    "122411", "142112", "142211", "241211", "221114", "413111", "241112", "134111", "111242",
    "121142", "121241", "114212", "124112", "124211", "411212", "421112", "421211", "212141",
    "214121", "412121", "111143", "111341", "131141", "114113", "114311", "411113", "411311",
    "113141", "114131", "311141", "411131", "211412", "211214", "211232", "2331112",
];

/// Module widths of a Code 128 symbol in code set B
pub fn code128_modules(text: &str) -> Vec<u8> {
    let mut codes = vec![104usize];
    codes.extend(text.bytes().map(|b| (b - b' ') as usize));
    let check = codes
        .iter()
        .enumerate()
        .skip(1)
        .fold(codes[0], |acc, (i, &c)| acc + i * c)
        % 103;
    codes.push(check);
    codes.push(106);

    let mut modules = vec![12u8];
    for code in codes {
        modules.extend(CODE128[code].bytes().map(|b| b - b'0'));
    }
    modules.push(12);
    modules
}

/// Save `image` as PNG under `dir`
pub fn save_png(dir: &Path, name: &str, image: &GrayImage) -> PathBuf {
    let path = dir.join(name);
    image.save(&path).expect("write png fixture");
    path
}
