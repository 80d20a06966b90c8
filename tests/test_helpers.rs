// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 在内存中生成测试工作簿 / GB18030 CSV，提供完整业务场景数据
// ==========================================

#![allow(dead_code)]

use rust_xlsxwriter::Workbook;

/// 测试单元格
#[derive(Debug, Clone)]
pub enum Cell {
    T(String),
    N(f64),
    E,
}

pub fn t(s: &str) -> Cell {
    Cell::T(s.to_string())
}

pub fn n(v: f64) -> Cell {
    Cell::N(v)
}

/// 测试工作表定义
#[derive(Debug, Clone)]
pub struct SheetSpec {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

pub fn sheet(name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> SheetSpec {
    SheetSpec {
        name: name.to_string(),
        headers: headers.iter().map(|h| h.to_string()).collect(),
        rows,
    }
}

/// 生成 xlsx 字节
pub fn workbook_bytes(sheets: &[SheetSpec]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    for spec in sheets {
        let ws = workbook.add_worksheet();
        ws.set_name(spec.name.as_str()).expect("sheet name");
        for (c, h) in spec.headers.iter().enumerate() {
            ws.write_string(0, c as u16, h.as_str()).expect("header");
        }
        for (r, row) in spec.rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = ((r + 1) as u32, c as u16);
                match cell {
                    Cell::T(s) => {
                        ws.write_string(r, c, s.as_str()).expect("text cell");
                    }
                    Cell::N(v) => {
                        ws.write_number(r, c, *v).expect("number cell");
                    }
                    Cell::E => {}
                }
            }
        }
    }
    workbook.save_to_buffer().expect("save workbook")
}

/// GB18030 编码的 CSV
pub fn gb18030_csv(text: &str) -> Vec<u8> {
    encoding_rs::GB18030.encode(text).0.into_owned()
}

// ==========================================
// 完整业务场景
// ==========================================
// 门店: 门店1 月均 4 (A) / 门店2 月均 1.5 (C) / 门店3 无出货 (D) / 门店4 月均 2 (B)
// 库存: ABC 120 箱；XYZ 10 箱；DEF 仅 400 规格 → 全部剔除并告警
// 出库: ABC 2024-10/11/12 = 30/40/20（2023-12 = 16）；XYZ 2024-12 = 15 + 5
// 业绩: 2024-12 广东 50 箱 / 广西 10 箱；2023-12 广东 40 箱
// 任务: 广东 12月 200（不写年份）；广西 2024年12月 40
// 扫码: 广东 ABC 2024-12 共 60 次

pub fn shipment_sheet() -> SheetSpec {
    sheet(
        "门店出货",
        &["省区", "客户简称", "门店名称", "2024年10月", "2024年11月", "2024年12月"],
        vec![
            vec![t("广东"), t("ABC"), t("门店1"), n(5.0), n(4.0), n(3.0)],
            vec![t("广东"), t("ABC"), t("门店2"), n(1.0), n(0.0), n(2.0)],
            vec![t("广东"), t("DEF"), t("门店3"), n(0.0), n(0.0), n(0.0)],
            vec![t("广西"), t("XYZ"), t("门店4"), n(2.0), n(2.0), n(2.0)],
        ],
    )
}

pub fn stock_sheet() -> SheetSpec {
    sheet(
        "库存",
        &[
            "客户编码", "客户全称", "物料编码", "物料名称", "库存听数", "库存箱数", "省区", "客户简称",
            "大类", "小类", "重量规格", "规格",
        ],
        vec![
            vec![
                t("C01"), t("ABC有限公司"), t("P1"), t("金装 1段"), n(720.0), n(120.0), t("广东"),
                t("ABC"), t("婴幼儿奶粉"), t("配方粉"), n(800.0), t("6罐"),
            ],
            vec![
                t("C01"), t("ABC有限公司"), t("P2"), t("有机 2段"), n(60.0), n(10.0), t("广东"),
                t("ABC"), t("婴幼儿奶粉"), t("配方粉"), n(900.0), t("6罐"),
            ],
            vec![
                t("C02"), t("DEF有限公司"), t("P3"), t("米粉"), n(30.0), n(5.0), t("广东"),
                t("DEF"), t("辅食"), t("米粉"), n(400.0), t("12袋"),
            ],
            vec![
                t("C03"), t("XYZ"), t("P4"), t("3段"), n(60.0), n(10.0), t("广西"), t("XYZ"),
                t("婴幼儿奶粉"), t("配方粉"), t("700g"), t("6罐"),
            ],
        ],
    )
}

pub fn outbound_sheet() -> SheetSpec {
    let row = |y: Cell, m: Cell, d: f64, p: &str, dist: &str, store: &str, boxes: f64| {
        vec![y, m, n(d), t(p), t(dist), t(store), t("婴幼儿奶粉"), t("配方粉"), n(boxes)]
    };
    sheet(
        "出库",
        &["年份", "月份", "日", "省区", "客户简称", "门店名称", "大类", "小类", "箱数"],
        vec![
            row(t("24年"), t("10月"), 5.0, "广东", "ABC", "门店1", 30.0),
            row(t("24年"), t("11月"), 6.0, "广东", "ABC", "门店1", 40.0),
            row(t("24年"), t("12月"), 7.0, "广东", "ABC", "门店2", 20.0),
            row(t("23年"), t("12月"), 7.0, "广东", "ABC", "门店2", 16.0),
            row(t("24年"), t("12月"), 8.0, "广西", "XYZ", "门店4", 15.0),
            row(n(2024.0), n(12.0), 9.0, "广西", "XYZ", "门店4", 5.0),
        ],
    )
}

pub fn ledger_sheet(name: &str) -> SheetSpec {
    let row = |y: f64, p: &str, dist: &str, boxes: f64, amount: f64, wh: &str| {
        vec![
            n(y),
            n(12.0),
            t(p),
            t(dist),
            n(boxes),
            n(amount),
            t(wh),
            t("配方粉"),
            t("高端"),
            t("婴幼儿奶粉"),
        ]
    };
    sheet(
        name,
        &["年份", "月份", "省区", "客户简称", "箱数", "金额", "仓库", "中类", "归类", "大类"],
        vec![
            row(2024.0, "广东", "ABC", 50.0, 5000.0, "广州仓"),
            row(2024.0, "广西", "XYZ", 10.0, 800.0, "南宁仓"),
            row(2023.0, "广东", "ABC", 40.0, 4000.0, "广州仓"),
        ],
    )
}

pub fn target_sheet() -> SheetSpec {
    sheet(
        "任务",
        &["省区", "区域", "负责人", "品类", "月份", "任务量"],
        vec![
            vec![t("广东"), t("华南"), t("张三"), t("婴幼儿奶粉"), t("12月"), n(200.0)],
            vec![t("广西"), t("华南"), t("李四"), t("婴幼儿奶粉"), t("2024年12月"), n(40.0)],
        ],
    )
}

pub fn scan_sheet() -> SheetSpec {
    let rows = (0..60)
        .map(|i| {
            let coords = if i % 2 == 0 { "116.4,39.9" } else { "39.9,116.4" };
            vec![
                t("门店1"),
                t("ABC"),
                t("广东"),
                t("婴幼儿奶粉"),
                t("配方粉"),
                t(coords),
                n(2024.0),
                n(12.0),
                n(1.0 + (i % 28) as f64),
            ]
        })
        .collect();
    sheet(
        "扫码",
        &["门店名称", "客户简称", "省区", "大类", "小类", "经纬度", "年份", "月份", "日"],
        rows,
    )
}

/// 六表完整工作簿（业绩台账位于第 4 个位置）
pub fn full_scenario_workbook() -> Vec<u8> {
    workbook_bytes(&[
        shipment_sheet(),
        stock_sheet(),
        outbound_sheet(),
        ledger_sheet("业绩台账"),
        target_sheet(),
        scan_sheet(),
    ])
}
