//! The compiled-in questionnaire.
//!
//! Ten questions, three options each, every option bound to one
//! [`Category`].  The table is immutable and shared by every session.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the three answer categories.
///
/// Declaration order is the tie-break precedence used by
/// [`classify`](super::scoring::classify): fire, then water, then wind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Fire,
    Water,
    Wind,
}

impl Category {
    /// All categories in precedence order.
    pub const ALL: [Category; 3] = [Category::Fire, Category::Water, Category::Wind];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Fire => "fire",
            Category::Water => "water",
            Category::Wind => "wind",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A selectable answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizOption {
    pub text: &'static str,
    pub category: Category,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    pub id: &'static str,
    pub prompt: &'static str,
    pub options: [QuizOption; 3],
}

impl Question {
    /// Category bound to `text`, or `None` when `text` is not one of this
    /// question's options.
    pub fn category_of(&self, text: &str) -> Option<Category> {
        self.options.iter().find(|o| o.text == text).map(|o| o.category)
    }
}

/// Find a question by id.
pub fn find<'q>(questions: &'q [Question], id: &str) -> Option<&'q Question> {
    questions.iter().find(|q| q.id == id)
}

const fn opt(text: &'static str, category: Category) -> QuizOption {
    QuizOption { text, category }
}

use Category::{Fire, Water, Wind};

pub static QUESTIONS: [Question; 10] = [
    Question {
        id: "q1",
        prompt: "I. 魂の渇望 - 将来、仕事を通じて得たいものは？",
        options: [
            opt("💰 高い年収と社会的地位（成功・野心）", Fire),
            opt("🧠 専門スキルと知的好奇心（成長・探究）", Water),
            opt("🤝 仲間からの感謝と安心感（貢献・安定）", Wind),
        ],
    },
    Question {
        id: "q2",
        prompt: "II. 魔力の源泉 - グループワークや部活での役割は？",
        options: [
            opt("🔥 皆を引っ張るリーダー・部長タイプ", Fire),
            opt("💧 計画を立てる参謀・書記タイプ", Water),
            opt("🌿 間を取り持つ調整役・ムードメーカー", Wind),
        ],
    },
    Question {
        id: "q3",
        prompt: "III. 冒険の指針 - 全く新しい課題が出たらどうする？",
        options: [
            opt("⚔️ 「とりあえずやってみよう」と手を動かす", Fire),
            opt("🗺️ 「まずは情報を集めよう」と教科書を開く", Water),
            opt("🛡️ 「みんなはどう思う？」と友達と相談する", Wind),
        ],
    },
    Question {
        id: "q4",
        prompt: "IV. 求める秘宝 - 居心地が良いと感じる環境は？",
        options: [
            opt("👑 実力主義で、成果を出せば評価される場所", Fire),
            opt("📜 静かで、自分の研究や作業に没頭できる場所", Water),
            opt("🕊️ アットホームで、先輩後輩が仲良い場所", Wind),
        ],
    },
    Question {
        id: "q5",
        prompt: "V. 試練の刻 - バイトや部活でトラブル発生！どう動く？",
        options: [
            opt("⚡️ 自分が先頭に立って、その場で解決する", Fire),
            opt("🔍 なぜ起きたか原因を分析し、再発を防ぐ", Water),
            opt("📣 周りの人に状況を伝え、協力を仰ぐ", Wind),
        ],
    },
    Question {
        id: "q6",
        prompt: "VI. 交信の作法 - プレゼンや発表で意識することは？",
        options: [
            opt("🔥 「情熱」や「想い」を熱く伝える", Fire),
            opt("💧 「データ」や「論理」を正確に伝える", Water),
            opt("🌿 「聞き手」が楽しんでいるかを気にする", Wind),
        ],
    },
    Question {
        id: "q7",
        prompt: "VII. 失敗の代償 - テストや試合で負けた時、どう思う？",
        options: [
            opt("🔥 「次は絶対勝つ！」と闘志を燃やす", Fire),
            opt("💧 「敗因は何か？」と冷静に分析する", Water),
            opt("🌿 「チームに申し訳ない」と責任を感じる", Wind),
        ],
    },
    Question {
        id: "q8",
        prompt: "VIII. 究極スキル - 今、大学生活で身につけたい力は？",
        options: [
            opt("🔥 人を巻き込み、何かを成し遂げる「行動力」", Fire),
            opt("💧 物事の本質を見抜き、解決する「思考力」", Water),
            opt("🌿 誰とでも信頼関係を築ける「対人力」", Wind),
        ],
    },
    Question {
        id: "q9",
        prompt: "IX. 安息の地 - 休日の理想的な過ごし方は？",
        options: [
            opt("🔥 イベントや旅行など、アクティブに動く", Fire),
            opt("💧 読書、映画、ゲームなど、知識を深める", Water),
            opt("🌿 友達や恋人とカフェでのんびり話す", Wind),
        ],
    },
    Question {
        id: "q10",
        prompt: "X. 伝説の終わり - 卒業時、周りからどう言われたい？",
        options: [
            opt("🔥 「あいつは凄かった、伝説だ」", Fire),
            opt("💧 「あいつがいれば何でも解決した」", Water),
            opt("🌿 「あいつがいてくれて本当に楽しかった」", Wind),
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ten_questions_with_unique_ids() {
        let ids: HashSet<_> = QUESTIONS.iter().map(|q| q.id).collect();
        assert_eq!(QUESTIONS.len(), 10);
        assert_eq!(ids.len(), 10);
    }

    #[test]
    fn every_question_covers_all_categories() {
        for q in &QUESTIONS {
            let cats: HashSet<_> = q.options.iter().map(|o| o.category).collect();
            assert_eq!(cats.len(), 3, "{} should offer one option per category", q.id);
        }
    }

    #[test]
    fn category_of_matches_exact_text_only() {
        let q = &QUESTIONS[0];
        assert_eq!(q.category_of(q.options[1].text), Some(Category::Water));
        assert_eq!(q.category_of("not an option"), None);
    }

    #[test]
    fn find_by_id() {
        assert_eq!(find(&QUESTIONS, "q10").map(|q| q.id), Some("q10"));
        assert!(find(&QUESTIONS, "q11").is_none());
    }

    #[test]
    fn category_precedence_order() {
        assert!(Category::Fire < Category::Water);
        assert!(Category::Water < Category::Wind);
        assert_eq!(Category::Wind.to_string(), "wind");
    }
}
