use serde::Serialize;
use std::ops::RangeInclusive;

use crate::models::{Difficulty, DifficultyDistribution, EducationLevel};

/// Fixed number of questions in a full quiz
pub const QUIZ_SIZE: usize = 20;

/// Grades taught at each level
pub fn grade_range(level: EducationLevel) -> RangeInclusive<u8> {
    match level {
        EducationLevel::Primary => 1..=5,
        EducationLevel::Middle => 6..=9,
        EducationLevel::High => 10..=12,
    }
}

pub fn is_valid_grade(level: EducationLevel, grade: u8) -> bool {
    grade_range(level).contains(&grade)
}

/// Static difficulty mix for a level and grade. Every entry sums to `QUIZ_SIZE`.
pub fn distribution_for(level: EducationLevel, grade: u8) -> DifficultyDistribution {
    let (recognition, understanding, application) = match level {
        EducationLevel::Primary if grade <= 2 => (12, 6, 2),
        EducationLevel::Primary => (10, 6, 4),
        EducationLevel::Middle => (6, 8, 6),
        EducationLevel::High => (4, 8, 8),
    };

    DifficultyDistribution {
        recognition,
        understanding,
        application,
    }
}

/// Display name of a level in the learner UI
pub fn level_label(level: EducationLevel) -> &'static str {
    match level {
        EducationLevel::Primary => "TIỂU HỌC 🌱",
        EducationLevel::Middle => "THCS 📚",
        EducationLevel::High => "THPT 🎯",
    }
}

/// Suggested topics for one grade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradeTopics {
    pub grade: u8,
    pub label: &'static str,
    pub topics: &'static [&'static str],
}

const GRADE_TOPICS: [GradeTopics; 12] = [
    GradeTopics {
        grade: 1,
        label: "Lớp 1",
        topics: &[
            "Số tự nhiên từ 0 đến 10",
            "Số tự nhiên từ 11 đến 20",
            "Phép cộng trong phạm vi 20",
            "Phép trừ trong phạm vi 20",
            "Nhận biết hình: Hình tròn, hình vuông, hình tam giác, hình chữ nhật",
            "So sánh độ dài (dài hơn, ngắn hơn)",
            "So sánh khối lượng (nặng hơn, nhẹ hơn)",
        ],
    },
    GradeTopics {
        grade: 2,
        label: "Lớp 2",
        topics: &[
            "Số tự nhiên trong phạm vi 100",
            "Phép cộng trong phạm vi 100 (có nhớ và không nhớ)",
            "Phép trừ trong phạm vi 100 (có nhớ và không nhớ)",
            "Bảng nhân 2, 3, 4, 5",
            "Phép nhân với số có một chữ số",
            "Phép chia đơn giản (chia hết)",
            "Hình chữ nhật và hình vuông",
            "Đo độ dài: cm, dm, m",
        ],
    },
    GradeTopics {
        grade: 3,
        label: "Lớp 3",
        topics: &[
            "Số tự nhiên trong phạm vi 100 000",
            "Phép cộng, trừ trong phạm vi 100 000",
            "Phép nhân, chia với số có một chữ số",
            "Bảng nhân 6, 7, 8, 9",
            "Hình học: Đoạn thẳng, góc, tam giác, tứ giác",
            "Đo lường: Độ dài, khối lượng, thời gian",
            "Giải toán có lời văn (1-2 bước)",
        ],
    },
    GradeTopics {
        grade: 4,
        label: "Lớp 4",
        topics: &[
            "Số tự nhiên trong phạm vi 1 000 000",
            "Phép tính với số có hai chữ số",
            "Phân số đơn giản (tử số nhỏ)",
            "So sánh phân số cùng mẫu số",
            "Hình chữ nhật, hình vuông: Chu vi và diện tích",
            "Bài toán có lời văn (2-3 bước tính)",
            "Đơn vị đo diện tích (cm², dm², m²)",
        ],
    },
    GradeTopics {
        grade: 5,
        label: "Lớp 5",
        topics: &[
            "Số thập phân, tính toán với số thập phân",
            "Phép chia có số dư",
            "Phân số: So sánh, cộng, trừ phân số khác mẫu",
            "Rút gọn phân số, quy đồng mẫu số",
            "Hình học: Hình tam giác, hình thang - Diện tích",
            "Hình tròn: Chu vi và diện tích",
            "Bài toán về tỉ lệ, tỉ số phần trăm cơ bản",
        ],
    },
    GradeTopics {
        grade: 6,
        label: "Lớp 6",
        topics: &[
            "Số nguyên, phép toán với số nguyên",
            "Phân số, số thập phân nâng cao",
            "Tỉ lệ thức, chia tỉ lệ",
            "Hình học: Góc, đường thẳng song song, đường thẳng vuông góc",
            "Số học: Ước, bội, số nguyên tố",
            "Phân tích số ra thừa số nguyên tố",
        ],
    },
    GradeTopics {
        grade: 7,
        label: "Lớp 7",
        topics: &[
            "Số hữu tỉ, biểu thức đại số",
            "Đơn thức, đa thức một biến",
            "Phương trình bậc nhất một ẩn",
            "Thống kê: Bảng tần số, biểu đồ",
            "Hình học: Tam giác, các trường hợp bằng nhau của tam giác",
            "Quan hệ giữa các yếu tố trong tam giác",
            "Tam giác cân, tam giác đều",
        ],
    },
    GradeTopics {
        grade: 8,
        label: "Lớp 8",
        topics: &[
            "Phân thức đại số",
            "Phương trình bậc nhất hai ẩn, hệ phương trình",
            "Bất phương trình bậc nhất một ẩn",
            "Hình học: Tứ giác, đa giác, diện tích",
            "Hình thang, hình thang cân, hình bình hành",
            "Hình chữ nhật, hình thoi, hình vuông",
            "Định lý Pythagore và ứng dụng",
        ],
    },
    GradeTopics {
        grade: 9,
        label: "Lớp 9",
        topics: &[
            "Căn bậc hai, biểu thức chứa căn",
            "Hàm số bậc nhất, đồ thị hàm số y = ax + b",
            "Phương trình bậc hai một ẩn",
            "Công thức nghiệm, công thức nghiệm thu gọn",
            "Hệ thức Vi-et và ứng dụng",
            "Hệ thức lượng trong tam giác vuông",
            "Tỉ số lượng giác của góc nhọn",
            "Đường tròn, dây cung, góc ở tâm, góc nội tiếp",
        ],
    },
    GradeTopics {
        grade: 10,
        label: "Lớp 10",
        topics: &[
            "Mệnh đề, mệnh đề phủ định, mệnh đề kéo theo",
            "Tập hợp: Giao, hợp, hiệu, phần bù",
            "Hàm số: Tập xác định, tập giá trị, tính đơn điệu",
            "Hàm số bậc nhất, bậc hai",
            "Phương trình và bất phương trình chứa dấu giá trị tuyệt đối",
            "Vectơ: Định nghĩa, phép toán",
            "Tọa độ của vectơ trong mặt phẳng",
            "Tích vô hướng của hai vectơ",
            "Phương trình đường thẳng, đường tròn",
        ],
    },
    GradeTopics {
        grade: 11,
        label: "Lớp 11",
        topics: &[
            "Hàm số lượng giác",
            "Công thức lượng giác cơ bản",
            "Công thức cộng, công thức nhân đôi, công thức biến đổi",
            "Phương trình lượng giác cơ bản",
            "Dãy số: Cách cho dãy số, giới hạn dãy số",
            "Cấp số cộng, cấp số nhân",
            "Giới hạn của hàm số, hàm số liên tục",
            "Đạo hàm: Định nghĩa, ý nghĩa, quy tắc tính",
            "Hình học không gian: Đường thẳng và mặt phẳng",
            "Quan hệ song song và vuông góc trong không gian",
        ],
    },
    GradeTopics {
        grade: 12,
        label: "Lớp 12",
        topics: &[
            "Khảo sát hàm số bậc ba, bậc bốn trùng phương",
            "Khảo sát hàm số nhất biến (phân thức)",
            "Tiếp tuyến của đồ thị hàm số",
            "Cực trị của hàm số",
            "Giá trị lớn nhất, giá trị nhỏ nhất",
            "Hàm số mũ và hàm số logarit",
            "Phương trình, bất phương trình mũ và logarit",
            "Nguyên hàm: Định nghĩa, tính chất",
            "Tích phân và ứng dụng (diện tích, thể tích)",
            "Số phức: Định nghĩa, phép toán",
            "Hệ tọa độ trong không gian Oxyz",
            "Phương trình mặt phẳng, đường thẳng trong không gian",
            "Mặt cầu, khoảng cách trong không gian",
        ],
    },
];

/// Catalog entry for a grade; `None` outside grades 1 to 12
pub fn grade_topics(grade: u8) -> Option<&'static GradeTopics> {
    GRADE_TOPICS.iter().find(|entry| entry.grade == grade)
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeOverview {
    pub grade: u8,
    pub label: &'static str,
    pub topics: &'static [&'static str],
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelOverview {
    pub level: EducationLevel,
    pub label: &'static str,
    pub grades: Vec<GradeOverview>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DifficultyOverview {
    pub id: Difficulty,
    pub label: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumOverview {
    pub quiz_size: usize,
    pub levels: Vec<LevelOverview>,
    pub difficulties: Vec<DifficultyOverview>,
}

pub fn overview() -> CurriculumOverview {
    CurriculumOverview {
        quiz_size: QUIZ_SIZE,
        levels: EducationLevel::ALL
            .iter()
            .map(|&level| LevelOverview {
                level,
                label: level_label(level),
                grades: grade_range(level)
                    .filter_map(grade_topics)
                    .map(|entry| GradeOverview {
                        grade: entry.grade,
                        label: entry.label,
                        topics: entry.topics,
                    })
                    .collect(),
            })
            .collect(),
        difficulties: Difficulty::ALL
            .iter()
            .map(|&id| DifficultyOverview {
                id,
                label: id.label(),
            })
            .collect(),
    }
}
