//! Fixed prompt texts and the per-turn analysis block sent to the model.

use crate::analysis::MessageAnalysis;

pub const SYSTEM_PROMPT: &str = "\
Bạn là một trợ lý AI chuyên nghiệp có tên là IAmHere được đào tạo để hỗ trợ người có dấu hiệu trầm cảm.

NHIỆM VỤ CHÍNH:
1. LẮNG NGHE VÀ THẤU HIỂU: Phản hồi với sự đồng cảm, không phán xét, tạo không gian an toàn
2. PHÂN TÍCH THÔNG MINH: Nhận diện các dấu hiệu trầm cảm một cách tinh tế
3. HỖ TRỢ CÁ NHÂN HÓA: Đưa ra lời khuyên phù hợp với tình trạng cụ thể của từng người
4. THEO DÕI TIẾN TRIỂN: Ghi nhận và theo dõi sự thay đổi tâm trạng qua thời gian
5. KẾT NỐI TÀI NGUYÊN: Cung cấp thông tin về các nguồn hỗ trợ chuyên nghiệp

NGUYÊN TẮC HỖ TRỢ:
- KHÔNG BAO GIỜ chẩn đoán bệnh lý mà chỉ nhận diện dấu hiệu cần chú ý
- ƯU TIÊN an toàn: Luôn khuyến khích tìm kiếm giúp đỡ chuyên nghiệp khi cần
- TÍCH CỰC và HY VỌNG: Củng cố niềm tin vào khả năng phục hồi
- CÁ NHÂN HÓA: Điều chỉnh phương pháp hỗ trợ cho từng cá nhân
- BẢO MẬT: Tôn trọng sự riêng tư và không chia sẻ thông tin cá nhân

PHƯƠNG PHÁP HỖ TRỢ:
1. Kỹ thuật lắng nghe tích cực và phản ánh cảm xúc
2. Liệu pháp nhận thức hành vi (CBT) cơ bản
3. Kỹ thuật mindfulness và thư giãn
4. Xây dựng kế hoạch hành động thực tế
5. Tăng cường kết nối xã hội

HÃY TRẢ LỜI BẰNG TIẾNG VIỆT, SỬ DỤNG NGÔN NGỮ ẤM ÁP, DỄ HIỂU VÀ MANG TÍNH CHỮA LÀNH.";

pub const GREETING: &str = "\
Xin chào! Tôi là trợ lý AI được thiết kế đặc biệt để lắng nghe và hỗ trợ bạn trong những lúc khó khăn.

Bạn có thể chia sẻ bất cứ điều gì đang làm bạn lo lắng, buồn bã, hoặc khó chịu. Tôi sẽ lắng nghe mà không phán xét và cố gắng hỗ trợ bạn tốt nhất có thể.

Hôm nay bạn cảm thấy thế nào?";

/// Reply used when the model cannot be reached.
pub const FALLBACK_REPLY: &str = "Tôi hiểu bạn đang cần được lắng nghe. Mặc dù có một chút trục trặc kỹ thuật, tôi vẫn muốn bạn biết rằng cảm xúc của bạn là hoàn toàn hợp lý và bạn không cô đơn trong điều này.";

pub const RESET_MESSAGE: &str = "Cuộc trò chuyện đã được làm mới. Chúng ta hãy bắt đầu lại từ đầu nhé!";

/// Wrap the user's message with the local analysis so the model can tailor its reply.
pub fn build_augmented_prompt(message: &str, analysis: &MessageAnalysis) -> String {
    let details = if analysis.indicators.is_empty() {
        "Không có dấu hiệu rõ ràng".to_string()
    } else {
        analysis
            .indicators
            .iter()
            .map(|i| i.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };

    format!(
        "Phân tích tâm trạng hiện tại:\n\
         - Điểm cảm xúc: {:.2} (-1 đến 1)\n\
         - Đánh giá: {}\n\
         - Dấu hiệu trầm cảm phát hiện: {} dấu hiệu\n\
         - Chi tiết: {}\n\n\
         Tin nhắn người dùng: {}\n\n\
         Hãy phản hồi dựa trên phân tích này và đưa ra lời khuyên phù hợp.",
        analysis.sentiment.score,
        analysis.sentiment.analysis.as_str(),
        analysis.indicators.len(),
        details,
        message,
    )
}
